//! Deck implementation - in-memory track playback used as the scratch transport

use crate::transport::Transport;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Playback state for a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Deck snapshot for UI rendering
#[derive(Debug, Clone, Default)]
pub struct DeckState {
    pub playback: PlaybackState,
    pub position: f64, // seconds
    pub duration: f64, // seconds
    pub rate: f32,     // 1.0 = original speed
    pub track_name: Option<String>,
}

impl DeckState {
    /// Fraction of the track already played (0.0 - 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// A single deck holding one decoded track
pub struct Deck {
    /// Audio samples (interleaved stereo) - Arc to avoid copying on load
    samples: Arc<Vec<f32>>,
    /// Sample rate of loaded audio
    sample_rate: u32,
    /// Current playback position in frames
    position: f64,
    /// Playback state
    state: PlaybackState,
    /// Playback rate (1.0 = normal)
    rate: f32,
    /// Track name
    track_name: Option<String>,
}

impl Deck {
    /// Fastest rate the deck will play at
    pub const MAX_RATE: f32 = 4.0;

    /// Create a new empty deck
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(Vec::new()),
            sample_rate,
            position: 0.0,
            state: PlaybackState::Stopped,
            rate: 1.0,
            track_name: None,
        }
    }

    /// Load interleaved stereo samples, rewinding to the start
    pub fn load(&mut self, samples: Arc<Vec<f32>>, sample_rate: u32, name: Option<String>) {
        self.samples = samples;
        self.sample_rate = sample_rate;
        self.position = 0.0;
        self.state = PlaybackState::Stopped;
        self.rate = 1.0;
        self.track_name = name;
    }

    /// Check if deck has a track loaded
    pub fn is_loaded(&self) -> bool {
        !self.samples.is_empty()
    }

    /// Start playback
    pub fn play(&mut self) {
        if self.is_loaded() {
            self.state = PlaybackState::Playing;
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Set playback position in seconds
    pub fn seek(&mut self, position_secs: f64) {
        let max_frames = self.frame_count() as f64;
        let target = position_secs * self.sample_rate as f64;
        // NaN would poison every later position read
        self.position = if target.is_nan() {
            0.0
        } else {
            target.clamp(0.0, max_frames)
        };
    }

    /// Set playback rate
    pub fn set_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.rate = rate.clamp(0.0, Self::MAX_RATE);
        }
    }

    /// Current playback rate
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Playback state
    pub fn playback(&self) -> PlaybackState {
        self.state
    }

    /// Get track duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Get current position in seconds
    pub fn position_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.position / self.sample_rate as f64
    }

    fn frame_count(&self) -> usize {
        self.samples.len() / 2
    }

    /// Get deck state for UI
    pub fn state(&self) -> DeckState {
        DeckState {
            playback: self.state,
            position: self.position_secs(),
            duration: self.duration(),
            rate: self.rate,
            track_name: self.track_name.clone(),
        }
    }

    /// Fill a stereo interleaved output buffer, advancing the playhead by
    /// `rate` frames per output frame
    pub fn process(&mut self, output: &mut [f32]) {
        if self.state != PlaybackState::Playing || self.samples.is_empty() {
            output.fill(0.0);
            return;
        }

        let frames = self.frame_count();

        for frame in output.chunks_mut(2) {
            let pos = self.position as usize;

            if pos + 1 >= frames {
                // End of track: hold the playhead at the end
                self.state = PlaybackState::Paused;
                self.position = frames as f64;
                frame.fill(0.0);
                continue;
            }

            // Linear interpolation for smoother playback at non-integer positions
            let frac = self.position.fract() as f32;
            let l0 = self.samples[pos * 2];
            let r0 = self.samples[pos * 2 + 1];
            let l1 = self.samples[pos * 2 + 2];
            let r1 = self.samples[pos * 2 + 3];

            frame[0] = l0 + frac * (l1 - l0);
            if let Some(right) = frame.get_mut(1) {
                *right = r0 + frac * (r1 - r0);
            }

            self.position += self.rate as f64;
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(44100)
    }
}

impl Transport for Deck {
    fn is_loaded(&self) -> bool {
        Deck::is_loaded(self)
    }

    fn position(&self) -> f64 {
        self.position_secs()
    }

    fn seek(&mut self, secs: f64) {
        Deck::seek(self, secs)
    }

    fn duration(&self) -> f64 {
        Deck::duration(self)
    }

    fn rate(&self) -> f32 {
        self.rate
    }

    fn set_rate(&mut self, rate: f32) {
        Deck::set_rate(self, rate)
    }

    fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    fn play(&mut self) {
        Deck::play(self)
    }

    fn pause(&mut self) {
        Deck::pause(self)
    }
}

/// Deck shared between the audio callback and the controller
///
/// Each [`Transport`] call takes the lock on its own, so the audio thread can
/// advance the position between two calls.
#[derive(Clone, Default)]
pub struct SharedDeck {
    inner: Arc<Mutex<Deck>>,
}

impl SharedDeck {
    pub fn new(deck: Deck) -> Self {
        Self {
            inner: Arc::new(Mutex::new(deck)),
        }
    }

    /// Lock the deck for a compound operation
    pub fn lock(&self) -> MutexGuard<'_, Deck> {
        self.inner.lock()
    }

    /// Render audio without blocking; outputs silence on contention
    pub fn try_process(&self, output: &mut [f32]) -> bool {
        match self.inner.try_lock() {
            Some(mut deck) => {
                deck.process(output);
                true
            }
            None => {
                output.fill(0.0);
                false
            }
        }
    }

    /// Snapshot for UI rendering
    pub fn state(&self) -> DeckState {
        self.inner.lock().state()
    }
}

impl Transport for SharedDeck {
    fn is_loaded(&self) -> bool {
        self.inner.lock().is_loaded()
    }

    fn position(&self) -> f64 {
        self.inner.lock().position_secs()
    }

    fn seek(&mut self, secs: f64) {
        self.inner.lock().seek(secs)
    }

    fn duration(&self) -> f64 {
        self.inner.lock().duration()
    }

    fn rate(&self) -> f32 {
        self.inner.lock().rate()
    }

    fn set_rate(&mut self, rate: f32) {
        self.inner.lock().set_rate(rate)
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().playback() == PlaybackState::Playing
    }

    fn play(&mut self) {
        self.inner.lock().play()
    }

    fn pause(&mut self) {
        self.inner.lock().pause()
    }
}
