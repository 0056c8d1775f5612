//! Scratch engine building blocks
//!
//! - Rotation: pointer samples to angular speed and direction
//! - Momentum: spin energy built by sustained dragging
//! - Mapper: speed + momentum to a bounded playback rate
//! - Chunk: backward playback broken into short chunks with gaps

mod chunk;
mod mapper;
mod momentum;
mod rotation;

pub use chunk::{ChunkPhase, ChunkState, ChunkStep, ResumeOutcome, ReverseChunker};
pub use mapper::{RateMapper, RateMapping};
pub use momentum::Momentum;
pub use rotation::{
    normalize_delta, Bounds, Direction, DragSession, Point, RotationSample, RotationState,
    RotationTracker,
};
