//! Rotation tracking - pointer samples to angular speed and direction

use crate::params::ScratchParams;
use std::f32::consts::PI;
use std::time::Duration;

/// Platter spin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Clockwise on screen, plays forward
    #[default]
    Forward,
    /// Counter-clockwise, plays backward in chunks
    Reverse,
}

impl Direction {
    pub fn display_name(&self) -> &'static str {
        match self {
            Direction::Forward => "Forward",
            Direction::Reverse => "Reverse (Chunked)",
        }
    }

    /// +1.0 for forward, -1.0 for reverse
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Pointer position in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// On-screen bounds of the platter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.left + self.width
            && point.y >= self.top
            && point.y < self.top + self.height
    }
}

/// Wrap an angle difference into (-π, π]
///
/// Inputs come from two `atan2` results, so one correction is enough.
#[inline]
pub fn normalize_delta(delta: f32) -> f32 {
    if delta > PI {
        delta - 2.0 * PI
    } else if delta <= -PI {
        delta + 2.0 * PI
    } else {
        delta
    }
}

/// Pointer-down interaction with the platter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// When the pointer went down
    pub started_at: Duration,
    /// Sum of time between samples
    pub duration: Duration,
    /// Angle of the previous sample, radians
    pub last_angle: f32,
    /// Time of the previous sample
    pub last_sample_at: Duration,
    /// Platter center captured at drag start
    pub center: Point,
}

impl DragSession {
    fn angle_of(&self, point: Point) -> f32 {
        (point.y - self.center.y).atan2(point.x - self.center.x)
    }
}

/// Visual and kinetic state of the platter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    /// Accumulated rotation for display, never wrapped
    pub rotation_degrees: f32,
    /// Speed derived from the last sample (always >= 0)
    pub instant_speed: f32,
    pub direction: Direction,
}

/// Result of one drag-move sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSample {
    pub delta_angle: f32,
    pub instant_speed: f32,
    pub direction: Direction,
    pub drag_duration: Duration,
}

/// Turns pointer samples into platter motion
#[derive(Debug, Clone)]
pub struct RotationTracker {
    session: Option<DragSession>,
    state: RotationState,
    speed_scale: f32,
}

impl RotationTracker {
    pub fn new(params: &ScratchParams) -> Self {
        Self {
            session: None,
            state: RotationState::default(),
            speed_scale: params.speed_scale,
        }
    }

    /// Start a drag; any session already open is replaced
    pub fn begin(&mut self, bounds: Bounds, point: Point, now: Duration) {
        let center = bounds.center();
        let mut session = DragSession {
            started_at: now,
            duration: Duration::ZERO,
            last_angle: 0.0,
            last_sample_at: now,
            center,
        };
        session.last_angle = session.angle_of(point);
        self.session = Some(session);
    }

    /// Feed one pointer sample; `None` when no drag is active
    pub fn sample(&mut self, point: Point, now: Duration) -> Option<RotationSample> {
        let session = self.session.as_mut()?;

        let angle = session.angle_of(point);
        let delta = normalize_delta(angle - session.last_angle);

        // Speed is per sample, not per second: faster pointer delivery gives
        // smaller deltas
        let instant_speed = delta.abs() * self.speed_scale;

        if delta > 0.0 {
            self.state.direction = Direction::Forward;
        } else if delta < 0.0 {
            self.state.direction = Direction::Reverse;
        }

        self.state.rotation_degrees += delta.to_degrees();
        self.state.instant_speed = instant_speed;

        session.duration += now.saturating_sub(session.last_sample_at);
        session.last_sample_at = now;
        session.last_angle = angle;

        Some(RotationSample {
            delta_angle: delta,
            instant_speed,
            direction: self.state.direction,
            drag_duration: session.duration,
        })
    }

    /// Finish the drag, returning the closed session
    pub fn end(&mut self) -> Option<DragSession> {
        self.session.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Scale the current speed once (used on release)
    pub fn damp(&mut self, factor: f32) {
        self.state.instant_speed *= factor;
    }

    /// One idle tick: turn by `speed`, then slow the instantaneous speed
    ///
    /// `speed` is the combined speed driving playback, so the drawn platter
    /// spins down together with the audio.
    pub fn coast(&mut self, speed: f32, decay: f32) {
        let radians = speed.max(0.0) / self.speed_scale;
        self.state.rotation_degrees += self.state.direction.sign() * radians.to_degrees();
        self.state.instant_speed *= decay;
    }

    /// Back to rest: no drag, no speed, zero rotation, forward
    pub fn reset(&mut self) {
        self.session = None;
        self.state = RotationState::default();
    }
}

impl Default for RotationTracker {
    fn default() -> Self {
        Self::new(&ScratchParams::default())
    }
}
