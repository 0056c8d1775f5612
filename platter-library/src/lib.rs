//! Track loading and user configuration for Platter

mod config;
mod loader;

pub use config::{apply_override, Config, OverrideError};
pub use loader::{to_stereo, LoadError, LoadEvent, LoadedTrack, TrackLoader, TrackMetadata};
