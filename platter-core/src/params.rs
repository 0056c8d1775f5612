//! Tuning constants for the scratch engine
//!
//! Defaults give the stock turntable feel. Every value can be
//! overridden from the user config; overrides go through [`ScratchParams::validate`].

use std::time::Duration;
use thiserror::Error;

/// Errors reported when a parameter set cannot drive the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{name} must be finite")]
    NotFinite { name: &'static str },
    #[error("{name} must be greater than zero (got {value})")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be within (0, 1] (got {value})")]
    DecayOutOfRange { name: &'static str, value: f64 },
    #[error("rate range is empty: min {min} > max {max}")]
    RateRange { min: f32, max: f32 },
}

/// Scratch engine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchParams {
    /// Speed units per radian of pointer motion in one sample
    pub speed_scale: f32,
    /// Instantaneous speed that counts as "full speed" for momentum build
    pub speed_normalizer: f32,
    /// Drag time after which the duration bonus is maxed out
    pub full_bonus_after: Duration,
    /// Momentum added per sample at full speed, before the duration bonus
    pub build_rate: f32,
    /// Momentum ceiling
    pub max_momentum: f32,
    /// Per-tick momentum multiplier while idle
    pub momentum_decay: f32,
    /// Per-tick speed multiplier while idle
    pub speed_decay: f32,
    /// Share of momentum added to instantaneous speed
    pub momentum_weight: f32,
    /// Combined speed below which an idle platter snaps back to 1.0x
    pub rest_threshold: f32,
    /// Combined speed below which the idle loop stops re-applying the mapping
    pub spin_floor: f32,
    /// Slowest rate while scratching
    pub min_rate: f32,
    /// Fastest rate while scratching
    pub max_rate: f32,
    /// Seconds scrubbed per unit of combined speed per update
    pub scrub_factor: f64,
    /// Length of one backward chunk in seconds
    pub chunk_duration: f64,
    /// Silence between backward chunks
    pub chunk_gap: Duration,
    /// Extra backward jump applied when a chunk ends
    pub chunk_back_offset: f64,
    /// Speed multiplier applied once when the platter is released
    pub release_damping: f32,
    /// Update loop frequency in Hz
    pub tick_rate: u32,
}

impl Default for ScratchParams {
    fn default() -> Self {
        Self {
            speed_scale: 10.0,
            speed_normalizer: 5.0,
            full_bonus_after: Duration::from_millis(2000),
            build_rate: 0.3,
            max_momentum: 100.0,
            momentum_decay: 0.95,
            speed_decay: 0.95,
            momentum_weight: 0.3,
            rest_threshold: 0.1,
            spin_floor: 0.01,
            min_rate: 0.5,
            max_rate: 3.0,
            scrub_factor: 0.1,
            chunk_duration: 1.5,
            chunk_gap: Duration::from_millis(200),
            chunk_back_offset: 0.5,
            release_damping: 0.9,
            tick_rate: 60,
        }
    }
}

impl ScratchParams {
    /// Check that the parameters describe a usable engine
    pub fn validate(&self) -> Result<(), ParamsError> {
        let finite = [
            ("speed_scale", self.speed_scale as f64),
            ("speed_normalizer", self.speed_normalizer as f64),
            ("build_rate", self.build_rate as f64),
            ("max_momentum", self.max_momentum as f64),
            ("momentum_weight", self.momentum_weight as f64),
            ("rest_threshold", self.rest_threshold as f64),
            ("spin_floor", self.spin_floor as f64),
            ("min_rate", self.min_rate as f64),
            ("max_rate", self.max_rate as f64),
            ("scrub_factor", self.scrub_factor),
            ("chunk_duration", self.chunk_duration),
            ("chunk_back_offset", self.chunk_back_offset),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite { name });
            }
        }

        let positive = [
            ("speed_scale", self.speed_scale as f64),
            ("speed_normalizer", self.speed_normalizer as f64),
            ("max_momentum", self.max_momentum as f64),
            ("min_rate", self.min_rate as f64),
            ("chunk_duration", self.chunk_duration),
            ("tick_rate", self.tick_rate as f64),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ParamsError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("build_rate", self.build_rate as f64),
            ("momentum_weight", self.momentum_weight as f64),
            ("rest_threshold", self.rest_threshold as f64),
            ("spin_floor", self.spin_floor as f64),
            ("scrub_factor", self.scrub_factor),
            ("chunk_back_offset", self.chunk_back_offset),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ParamsError::Negative { name, value });
            }
        }

        let decays = [
            ("momentum_decay", self.momentum_decay as f64),
            ("speed_decay", self.speed_decay as f64),
            ("release_damping", self.release_damping as f64),
        ];
        for (name, value) in decays {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ParamsError::DecayOutOfRange { name, value });
            }
        }

        if self.min_rate > self.max_rate {
            return Err(ParamsError::RateRange {
                min: self.min_rate,
                max: self.max_rate,
            });
        }

        Ok(())
    }

    /// Interval between update loop ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}
