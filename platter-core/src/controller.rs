//! Scratch controller - owns the engine state and drives the transport
//!
//! Pointer events and update-loop ticks arrive one at a time from a single
//! event loop and each runs to completion. The transport is the only state
//! shared with anything else (the audio callback advances its position), so
//! the controller re-reads it on every operation.

use crate::clock::Clock;
use crate::params::ScratchParams;
use crate::scratch::{
    Bounds, ChunkState, Direction, Momentum, Point, RateMapper, RateMapping, ReverseChunker,
    RotationState, RotationTracker,
};
use crate::transport::Transport;
use tracing::{debug, trace};

/// Events accepted by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Pointer pressed on the platter
    DragStart { bounds: Bounds, point: Point },
    /// Pointer moved while pressed
    DragMove(Point),
    /// Pointer released
    DragEnd,
    /// Update-loop frame
    Tick,
    Play,
    Pause,
    Toggle,
    Reset,
}

/// Controller snapshot for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScratchState {
    pub rotation: RotationState,
    pub momentum: f32,
    /// Instantaneous speed plus the momentum share
    pub combined_speed: f32,
    /// Momentum as a fraction of its ceiling
    pub momentum_level: f32,
    /// Last mapping applied to the transport
    pub mapping: RateMapping,
    pub dragging: bool,
    pub is_playing: bool,
    pub chunk: ChunkState,
}

/// Motion-to-playback engine bound to one transport
pub struct ScratchController<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    params: ScratchParams,
    tracker: RotationTracker,
    momentum: Momentum,
    mapper: RateMapper,
    chunker: ReverseChunker,
    mapping: RateMapping,
}

impl<T: Transport, C: Clock> ScratchController<T, C> {
    pub fn new(transport: T, clock: C, params: ScratchParams) -> Self {
        Self {
            tracker: RotationTracker::new(&params),
            momentum: Momentum::new(&params),
            mapper: RateMapper::new(&params),
            chunker: ReverseChunker::new(&params),
            mapping: RateMapping::default(),
            transport,
            clock,
            params,
        }
    }

    /// Controller with the default tuning
    pub fn with_defaults(transport: T, clock: C) -> Self {
        Self::new(transport, clock, ScratchParams::default())
    }

    /// Dispatch one event
    pub fn handle(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::DragStart { bounds, point } => self.drag_start(bounds, point),
            ControlEvent::DragMove(point) => {
                self.drag_move(point);
            }
            ControlEvent::DragEnd => self.drag_end(),
            ControlEvent::Tick => {
                self.tick();
            }
            ControlEvent::Play => self.play(),
            ControlEvent::Pause => self.pause(),
            ControlEvent::Toggle => self.toggle(),
            ControlEvent::Reset => self.reset(),
        }
    }

    /// Pointer pressed on the platter
    ///
    /// Each drag walks backward from where it starts, so chunk bookkeeping
    /// from an earlier drag is dropped.
    pub fn drag_start(&mut self, bounds: Bounds, point: Point) {
        let now = self.clock.now();
        self.tracker.begin(bounds, point, now);
        self.chunker.reset();
        trace!(x = point.x, y = point.y, "drag start");
    }

    /// Pointer moved; returns the mapping applied, if any
    pub fn drag_move(&mut self, point: Point) -> Option<RateMapping> {
        if !self.transport.is_loaded() {
            return None;
        }

        let now = self.clock.now();
        let sample = self.tracker.sample(point, now)?;

        let speed_factor = self.momentum.speed_factor(sample.instant_speed);
        let duration_bonus = self.momentum.duration_bonus(sample.drag_duration);
        self.momentum.build(speed_factor, duration_bonus);

        Some(self.update_playback())
    }

    /// Pointer released
    pub fn drag_end(&mut self) {
        if self.tracker.end().is_none() {
            return;
        }
        self.tracker.damp(self.params.release_damping);
        self.momentum.damp(self.params.release_damping);
        self.chunker.cancel_resume();
        trace!(speed = self.tracker.state().instant_speed, "drag end");
    }

    /// One update-loop frame
    ///
    /// Fires a due gap resume, then, while the platter is released and still
    /// turning, lets it spin down and re-applies the mapping. Returns whether
    /// the mapping was re-applied.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let rotation = self.tracker.state();
        let dragging = self.tracker.is_dragging();

        self.chunker
            .poll_resume(&mut self.transport, rotation.direction, dragging, now);

        if dragging {
            return false;
        }

        let combined = self
            .mapper
            .combined_speed(rotation.instant_speed, self.momentum.value());
        if combined <= self.params.spin_floor {
            return false;
        }

        self.momentum.decay();
        self.tracker.coast(combined, self.params.speed_decay);
        self.update_playback();
        true
    }

    /// Start playback if a source is loaded
    pub fn play(&mut self) {
        if self.transport.is_loaded() && !self.transport.is_playing() {
            self.transport.play();
        }
    }

    pub fn pause(&mut self) {
        self.transport.pause();
    }

    pub fn toggle(&mut self) {
        if self.transport.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop, rewind and bring the platter to rest
    ///
    /// Ends any drag in progress; further moves are ignored until the next
    /// drag start.
    pub fn reset(&mut self) {
        self.transport.pause();
        self.transport.seek(0.0);
        self.transport.set_rate(1.0);
        self.tracker.reset();
        self.momentum.reset();
        self.chunker.reset();
        self.mapping = RateMapping::default();
        debug!("scratch state reset");
    }

    /// A new source was loaded into the transport
    pub fn source_loaded(&mut self) {
        self.reset();
    }

    /// Recompute the mapping and apply it to the transport
    fn update_playback(&mut self) -> RateMapping {
        if !self.transport.is_loaded() {
            return self.mapping;
        }

        let now = self.clock.now();
        let rotation = self.tracker.state();
        let dragging = self.tracker.is_dragging();
        let mapping = self.mapper.map(
            rotation.instant_speed,
            self.momentum.value(),
            rotation.direction,
            dragging,
        );

        match mapping.direction {
            Direction::Forward => {
                if self.chunker.state() != ChunkState::default() {
                    self.chunker.reset();
                }
                self.transport.set_rate(mapping.rate);
                if dragging {
                    self.mapper
                        .scrub_forward(&mut self.transport, mapping.combined_speed);
                }
            }
            Direction::Reverse => {
                let distance = self.mapper.scrub_distance(mapping.combined_speed);
                self.chunker
                    .step(&mut self.transport, distance, dragging, now);
            }
        }

        if self.mapper.should_autoplay(&mapping, dragging)
            && !self.chunker.in_gap()
            && !self.transport.is_playing()
        {
            self.transport.play();
        }

        self.mapping = mapping;
        mapping
    }

    /// Snapshot for rendering
    pub fn state(&self) -> ScratchState {
        let rotation = self.tracker.state();
        ScratchState {
            rotation,
            momentum: self.momentum.value(),
            combined_speed: self
                .mapper
                .combined_speed(rotation.instant_speed, self.momentum.value()),
            momentum_level: self.momentum.level(),
            mapping: self.mapping,
            dragging: self.tracker.is_dragging(),
            is_playing: self.transport.is_playing(),
            chunk: self.chunker.state(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    pub fn params(&self) -> &ScratchParams {
        &self.params
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
