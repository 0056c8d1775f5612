//! Scratch engine for Platter
//!
//! Maps a dragged platter's motion onto playback of a recorded track:
//! - Scratch: rotation tracking, momentum, rate mapping, reverse chunks
//! - Controller: owns the engine state and applies it to a transport
//! - Deck: in-memory transport the audio callback renders from
//! - Ticker: fixed-cadence update loop scheduling

mod clock;
mod controller;
mod deck;
mod params;
pub mod scratch;
mod ticker;
mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ControlEvent, ScratchController, ScratchState};
pub use deck::{Deck, DeckState, PlaybackState, SharedDeck};
pub use params::{ParamsError, ScratchParams};
pub use scratch::{Bounds, ChunkPhase, ChunkState, Direction, Point, RateMapping, RotationState};
pub use ticker::Ticker;
pub use transport::Transport;
