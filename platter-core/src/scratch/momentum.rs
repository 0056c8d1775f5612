//! Spin momentum accumulated from sustained, fast dragging

use crate::params::ScratchParams;
use std::time::Duration;

/// Spin energy stored in the platter
#[derive(Debug, Clone)]
pub struct Momentum {
    value: f32,
    build_rate: f32,
    max: f32,
    decay: f32,
    speed_normalizer: f32,
    full_bonus_after: Duration,
}

impl Momentum {
    pub fn new(params: &ScratchParams) -> Self {
        Self {
            value: 0.0,
            build_rate: params.build_rate,
            max: params.max_momentum,
            decay: params.momentum_decay,
            speed_normalizer: params.speed_normalizer,
            full_bonus_after: params.full_bonus_after,
        }
    }

    /// Current momentum (0.0 - max)
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Momentum ceiling
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Momentum as a fraction of the ceiling (0.0 - 1.0)
    pub fn level(&self) -> f32 {
        if self.max > 0.0 {
            self.value / self.max
        } else {
            0.0
        }
    }

    /// Normalize an instantaneous speed into [0, 1]
    pub fn speed_factor(&self, instant_speed: f32) -> f32 {
        (instant_speed.max(0.0) / self.speed_normalizer).min(1.0)
    }

    /// Bonus for how long the current drag has lasted, in [0, 1]
    pub fn duration_bonus(&self, drag_duration: Duration) -> f32 {
        let full = self.full_bonus_after.as_secs_f32();
        if full <= 0.0 {
            return 1.0;
        }
        (drag_duration.as_secs_f32() / full).min(1.0)
    }

    /// Add energy for one drag sample
    pub fn build(&mut self, speed_factor: f32, duration_bonus: f32) {
        let gain = speed_factor * self.build_rate * (1.0 + duration_bonus);
        let next = self.value + gain;
        self.value = if next.is_finite() {
            next.clamp(0.0, self.max)
        } else {
            self.max
        };
    }

    /// Lose energy for one idle tick
    #[inline]
    pub fn decay(&mut self) {
        self.value *= self.decay;
    }

    /// Scale stored energy once (used on release)
    pub fn damp(&mut self, factor: f32) {
        self.value = (self.value * factor).clamp(0.0, self.max);
    }

    /// Drop all stored energy
    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new(&ScratchParams::default())
    }
}
