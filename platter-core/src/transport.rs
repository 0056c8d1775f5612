//! Media transport seen by the scratch engine

/// A playable source with a position clock
///
/// Positions and durations are in seconds. The position may advance on its
/// own between calls while the transport is playing, so callers must read it
/// fresh every time instead of caching it.
pub trait Transport {
    /// Whether a source is loaded
    fn is_loaded(&self) -> bool;

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Move the playhead, clamped to `[0, duration]`
    fn seek(&mut self, secs: f64);

    /// Length of the loaded source in seconds (0 when nothing is loaded)
    fn duration(&self) -> f64;

    /// Current playback rate (1.0 = normal speed)
    fn rate(&self) -> f32;

    /// Set the playback rate; transports only play forward
    fn set_rate(&mut self, rate: f32);

    /// Whether the transport is producing audio
    fn is_playing(&self) -> bool;

    /// Start playback (no-op without a source)
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn position(&self) -> f64 {
        (**self).position()
    }

    fn seek(&mut self, secs: f64) {
        (**self).seek(secs)
    }

    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn rate(&self) -> f32 {
        (**self).rate()
    }

    fn set_rate(&mut self, rate: f32) {
        (**self).set_rate(rate)
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }
}
