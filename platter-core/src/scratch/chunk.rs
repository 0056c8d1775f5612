//! Reverse chunk state machine
//!
//! Stepping the playhead backward at scratch speed turns speech into mush.
//! Instead, reverse motion walks backward through short chunks: the audio in
//! each chunk still plays forward, then a short silent gap follows and the
//! playhead jumps to just before the chunk it came from.
//!
//! ```text
//!   InChunk --(progress >= chunk_duration)--> InGap { entered_at }
//!   InGap   --(chunk_gap elapsed, still reverse + dragging)--> InChunk
//! ```
//!
//! The gap resume is a deadline polled by the update loop, not a detached
//! timer, so a resume that is no longer wanted is simply dropped.

use super::rotation::Direction;
use crate::params::ScratchParams;
use crate::transport::Transport;
use std::time::Duration;
use tracing::debug;

/// Where the machine is within the chunk/gap cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChunkPhase {
    /// Walking backward through the current chunk
    #[default]
    InChunk,
    /// Paused between chunks
    InGap { entered_at: Duration },
}

/// Chunk bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChunkState {
    /// Position where the current chunk began (unset until reverse starts)
    pub chunk_start: Option<f64>,
    pub phase: ChunkPhase,
    /// A resume is scheduled for the end of the gap
    pub resume_pending: bool,
}

impl ChunkState {
    pub fn in_gap(&self) -> bool {
        matches!(self.phase, ChunkPhase::InGap { .. })
    }
}

/// Outcome of one reverse update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkStep {
    /// Nothing to do (no source or no drag)
    Skipped,
    /// Playhead moved backward inside the chunk
    Stepped { position: f64, progress: f64 },
    /// Chunk finished; playhead jumped back and playback paused
    GapStarted { jump_to: f64 },
    /// Still inside the gap
    Waiting,
}

/// Outcome of polling the gap deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeOutcome {
    /// No resume scheduled
    NotPending,
    /// Gap not over yet
    Waiting,
    /// Playback restarted with a fresh chunk
    Resumed { chunk_start: f64 },
    /// Deadline reached but the drag ended or turned forward
    Discarded,
}

/// Drives backward playback chunk by chunk
#[derive(Debug, Clone)]
pub struct ReverseChunker {
    state: ChunkState,
    chunk_duration: f64,
    chunk_gap: Duration,
    back_offset: f64,
}

impl ReverseChunker {
    pub fn new(params: &ScratchParams) -> Self {
        Self {
            state: ChunkState::default(),
            chunk_duration: params.chunk_duration,
            chunk_gap: params.chunk_gap,
            back_offset: params.chunk_back_offset,
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn in_gap(&self) -> bool {
        self.state.in_gap()
    }

    /// Move backward by `distance` seconds for one drag update
    pub fn step<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        distance: f64,
        dragging: bool,
        now: Duration,
    ) -> ChunkStep {
        if !dragging || !transport.is_loaded() {
            return ChunkStep::Skipped;
        }

        if let ChunkPhase::InGap { entered_at } = self.state.phase {
            if now.saturating_sub(entered_at) < self.chunk_gap {
                return ChunkStep::Waiting;
            }
            let resume = self.state.resume_pending;
            self.start_chunk(transport.position());
            if resume {
                transport.play();
            }
        }

        let position = transport.position();
        let chunk_start = *self.state.chunk_start.get_or_insert(position);

        transport.seek((position - distance.max(0.0)).max(0.0));

        let position = transport.position();
        let progress = chunk_start - position;
        if progress >= self.chunk_duration {
            let jump_to = self.enter_gap(transport, chunk_start, now);
            return ChunkStep::GapStarted { jump_to };
        }

        ChunkStep::Stepped { position, progress }
    }

    /// Fire the gap resume if its deadline passed
    ///
    /// The resume only happens if the platter is still being dragged in
    /// reverse; otherwise it is dropped and playback stays paused.
    pub fn poll_resume<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        direction: Direction,
        dragging: bool,
        now: Duration,
    ) -> ResumeOutcome {
        if !self.state.resume_pending {
            return ResumeOutcome::NotPending;
        }

        let ChunkPhase::InGap { entered_at } = self.state.phase else {
            self.state.resume_pending = false;
            return ResumeOutcome::NotPending;
        };

        if now.saturating_sub(entered_at) < self.chunk_gap {
            return ResumeOutcome::Waiting;
        }

        self.state.resume_pending = false;

        if direction != Direction::Reverse || !dragging || !transport.is_loaded() {
            debug!("gap resume discarded");
            return ResumeOutcome::Discarded;
        }

        let chunk_start = transport.position();
        self.start_chunk(chunk_start);
        transport.play();
        debug!(chunk_start, "gap over, next chunk");
        ResumeOutcome::Resumed { chunk_start }
    }

    /// Drop a scheduled resume without touching the chunk position
    pub fn cancel_resume(&mut self) {
        if self.state.resume_pending {
            debug!("gap resume cancelled");
        }
        self.state.resume_pending = false;
    }

    /// Forget all chunk state, including any scheduled resume
    pub fn reset(&mut self) {
        self.state = ChunkState::default();
    }

    fn start_chunk(&mut self, position: f64) {
        self.state.phase = ChunkPhase::InChunk;
        self.state.chunk_start = Some(position);
        self.state.resume_pending = false;
    }

    fn enter_gap<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        chunk_start: f64,
        now: Duration,
    ) -> f64 {
        let jump_to = (chunk_start - self.chunk_duration - self.back_offset).max(0.0);
        transport.seek(jump_to);
        transport.pause();

        self.state.phase = ChunkPhase::InGap { entered_at: now };
        self.state.resume_pending = true;

        debug!(chunk_start, jump_to, "chunk done, entering gap");
        jump_to
    }
}

impl Default for ReverseChunker {
    fn default() -> Self {
        Self::new(&ScratchParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use std::sync::Arc;

    /// 100 seconds of silence at 10 Hz, playing from `at`
    fn deck_at(at: f64) -> Deck {
        let mut deck = Deck::new(10);
        deck.load(Arc::new(vec![0.0; 2000]), 10, None);
        deck.seek(at);
        deck.play();
        deck
    }

    #[test]
    fn test_progress_grows_until_gap() {
        let mut deck = deck_at(50.0);
        let mut chunker = ReverseChunker::default();
        let now = Duration::from_secs(1);

        let mut last_progress = 0.0;
        let mut steps = 0;
        loop {
            match chunker.step(&mut deck, 0.5, true, now) {
                ChunkStep::Stepped { progress, .. } => {
                    assert!(progress > last_progress);
                    assert!(progress < 1.5);
                    last_progress = progress;
                }
                ChunkStep::GapStarted { jump_to } => {
                    assert!((jump_to - 48.0).abs() < 1e-9);
                    break;
                }
                other => panic!("unexpected {other:?}"),
            }
            steps += 1;
            assert!(steps < 10);
        }

        assert_eq!(steps, 2);
        assert!(chunker.in_gap());
        assert!((deck.position_secs() - 48.0).abs() < 1e-9);
        assert!(!Transport::is_playing(&deck));
        assert_eq!(chunker.state().chunk_start, Some(50.0));
    }

    #[test]
    fn test_jump_clamped_at_track_start() {
        let mut deck = deck_at(1.6);
        let mut chunker = ReverseChunker::default();

        // 1.6 -> 0.0 in one step: progress 1.6 >= 1.5
        let step = chunker.step(&mut deck, 2.0, true, Duration::ZERO);
        assert_eq!(step, ChunkStep::GapStarted { jump_to: 0.0 });
        assert_eq!(deck.position_secs(), 0.0);
    }

    #[test]
    fn test_stuck_at_start_never_underflows() {
        let mut deck = deck_at(0.4);
        let mut chunker = ReverseChunker::default();
        for _ in 0..20 {
            chunker.step(&mut deck, 0.3, true, Duration::ZERO);
            assert!(deck.position_secs() >= 0.0);
        }
        assert!(!chunker.in_gap());
    }

    #[test]
    fn test_resume_after_gap() {
        let mut deck = deck_at(50.0);
        let mut chunker = ReverseChunker::default();
        let t0 = Duration::from_secs(2);
        for _ in 0..3 {
            chunker.step(&mut deck, 0.5, true, t0);
        }
        assert!(chunker.in_gap());

        let early = chunker.poll_resume(&mut deck, Direction::Reverse, true, t0 + Duration::from_millis(100));
        assert_eq!(early, ResumeOutcome::Waiting);
        assert!(!Transport::is_playing(&deck));

        let late = chunker.poll_resume(&mut deck, Direction::Reverse, true, t0 + Duration::from_millis(200));
        assert_eq!(late, ResumeOutcome::Resumed { chunk_start: 48.0 });
        assert!(Transport::is_playing(&deck));
        assert!(!chunker.in_gap());
        assert_eq!(chunker.state().chunk_start, Some(48.0));
    }

    #[test]
    fn test_stale_resume_is_discarded() {
        let mut deck = deck_at(50.0);
        let mut chunker = ReverseChunker::default();
        for _ in 0..3 {
            chunker.step(&mut deck, 0.5, true, Duration::ZERO);
        }

        // Direction flipped before the deadline
        let outcome = chunker.poll_resume(&mut deck, Direction::Forward, true, Duration::from_secs(1));
        assert_eq!(outcome, ResumeOutcome::Discarded);
        assert!(!Transport::is_playing(&deck));

        // Fires only once
        let again = chunker.poll_resume(&mut deck, Direction::Reverse, true, Duration::from_secs(2));
        assert_eq!(again, ResumeOutcome::NotPending);
        assert!(!Transport::is_playing(&deck));
    }

    #[test]
    fn test_cancelled_resume_never_plays() {
        let mut deck = deck_at(50.0);
        let mut chunker = ReverseChunker::default();
        for _ in 0..3 {
            chunker.step(&mut deck, 0.5, true, Duration::ZERO);
        }
        chunker.cancel_resume();

        let outcome = chunker.poll_resume(&mut deck, Direction::Reverse, true, Duration::from_secs(1));
        assert_eq!(outcome, ResumeOutcome::NotPending);
        assert!(!Transport::is_playing(&deck));
    }

    #[test]
    fn test_step_waits_in_gap_then_starts_new_chunk() {
        let mut deck = deck_at(50.0);
        let mut chunker = ReverseChunker::default();
        for _ in 0..3 {
            chunker.step(&mut deck, 0.5, true, Duration::ZERO);
        }

        let waiting = chunker.step(&mut deck, 0.5, true, Duration::from_millis(150));
        assert_eq!(waiting, ChunkStep::Waiting);
        assert!((deck.position_secs() - 48.0).abs() < 1e-9);

        let stepped = chunker.step(&mut deck, 0.5, true, Duration::from_millis(250));
        assert!(matches!(stepped, ChunkStep::Stepped { .. }));
        assert_eq!(chunker.state().chunk_start, Some(48.0));
        assert!((deck.position_secs() - 47.5).abs() < 1e-9);
        assert!(Transport::is_playing(&deck));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut deck = deck_at(50.0);
        let mut chunker = ReverseChunker::default();
        for _ in 0..3 {
            chunker.step(&mut deck, 0.5, true, Duration::ZERO);
        }
        chunker.reset();
        assert_eq!(chunker.state(), ChunkState::default());
        assert_eq!(
            chunker.poll_resume(&mut deck, Direction::Reverse, true, Duration::from_secs(5)),
            ResumeOutcome::NotPending
        );
    }

    #[test]
    fn test_skips_without_source_or_drag() {
        let mut empty = Deck::new(10);
        let mut chunker = ReverseChunker::default();
        assert_eq!(chunker.step(&mut empty, 0.5, true, Duration::ZERO), ChunkStep::Skipped);

        let mut deck = deck_at(10.0);
        assert_eq!(chunker.step(&mut deck, 0.5, false, Duration::ZERO), ChunkStep::Skipped);
        assert!((deck.position_secs() - 10.0).abs() < 1e-9);
        assert_eq!(chunker.state().chunk_start, None);
    }
}
