//! Playback-rate mapping - momentum and speed to transport rate

use super::rotation::Direction;
use crate::params::ScratchParams;
use crate::transport::Transport;

/// Rate and direction derived from the platter's motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateMapping {
    /// Instantaneous speed plus weighted momentum
    pub combined_speed: f32,
    /// Transport rate (min..=max while scratching, 1.0 at rest)
    pub rate: f32,
    pub direction: Direction,
}

impl Default for RateMapping {
    fn default() -> Self {
        Self {
            combined_speed: 0.0,
            rate: 1.0,
            direction: Direction::Forward,
        }
    }
}

/// Maps platter motion to playback
#[derive(Debug, Clone)]
pub struct RateMapper {
    momentum_weight: f32,
    rest_threshold: f32,
    min_rate: f32,
    max_rate: f32,
    scrub_factor: f64,
}

impl RateMapper {
    pub fn new(params: &ScratchParams) -> Self {
        Self {
            momentum_weight: params.momentum_weight,
            rest_threshold: params.rest_threshold,
            min_rate: params.min_rate,
            max_rate: params.max_rate,
            scrub_factor: params.scrub_factor,
        }
    }

    /// Instantaneous speed plus the momentum share, never negative
    #[inline]
    pub fn combined_speed(&self, instant_speed: f32, momentum: f32) -> f32 {
        let combined = instant_speed.max(0.0) + momentum.max(0.0) * self.momentum_weight;
        if combined.is_finite() {
            combined
        } else {
            0.0
        }
    }

    /// Pure mapping from motion to rate
    pub fn map(
        &self,
        instant_speed: f32,
        momentum: f32,
        direction: Direction,
        dragging: bool,
    ) -> RateMapping {
        let combined_speed = self.combined_speed(instant_speed, momentum);

        let rate = if !dragging && combined_speed < self.rest_threshold {
            1.0
        } else {
            combined_speed.clamp(self.min_rate, self.max_rate)
        };

        RateMapping {
            combined_speed,
            rate,
            direction,
        }
    }

    /// Seconds to move the playhead for one update at this speed
    #[inline]
    pub fn scrub_distance(&self, combined_speed: f32) -> f64 {
        combined_speed as f64 * self.scrub_factor
    }

    /// Push the playhead forward, never past the end of the track
    pub fn scrub_forward<T: Transport + ?Sized>(&self, transport: &mut T, combined_speed: f32) {
        let target = transport.position() + self.scrub_distance(combined_speed);
        transport.seek(target.min(transport.duration()));
    }

    /// Whether scratching at this speed should start a stopped transport
    pub fn should_autoplay(&self, mapping: &RateMapping, dragging: bool) -> bool {
        dragging && mapping.combined_speed > self.rest_threshold
    }
}

impl Default for RateMapper {
    fn default() -> Self {
        Self::new(&ScratchParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use std::sync::Arc;

    #[test]
    fn test_idle_slow_snaps_to_unity() {
        let mapper = RateMapper::default();
        let mapping = mapper.map(0.05, 0.1, Direction::Forward, false);
        assert_eq!(mapping.rate, 1.0);
        assert!((mapping.combined_speed - 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_dragging_slow_clamps_to_min() {
        let mapper = RateMapper::default();
        let mapping = mapper.map(0.05, 0.0, Direction::Forward, true);
        assert_eq!(mapping.rate, 0.5);
    }

    #[test]
    fn test_rate_bounded_while_scratching() {
        let mapper = RateMapper::default();
        for speed in [0.0f32, 0.2, 0.9, 1.7, 3.0, 8.0, 1e6] {
            for momentum in [0.0f32, 10.0, 100.0] {
                let mapping = mapper.map(speed, momentum, Direction::Reverse, true);
                assert!((0.5..=3.0).contains(&mapping.rate));
            }
        }
    }

    #[test]
    fn test_momentum_weight() {
        let mapper = RateMapper::default();
        let mapping = mapper.map(1.0, 2.0, Direction::Forward, true);
        assert!((mapping.combined_speed - 1.6).abs() < 1e-6);
        assert!((mapping.rate - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_scrub_forward_stops_at_end() {
        let mapper = RateMapper::default();
        let mut deck = Deck::new(10);
        deck.load(Arc::new(vec![0.0; 200]), 10, None); // 10 seconds
        deck.seek(9.9);

        mapper.scrub_forward(&mut deck, 5.0);
        assert!((deck.position_secs() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_autoplay_needs_drag_and_speed() {
        let mapper = RateMapper::default();
        let fast = mapper.map(2.0, 0.0, Direction::Forward, true);
        let slow = mapper.map(0.05, 0.0, Direction::Forward, true);
        assert!(mapper.should_autoplay(&fast, true));
        assert!(!mapper.should_autoplay(&fast, false));
        assert!(!mapper.should_autoplay(&slow, true));
    }
}
