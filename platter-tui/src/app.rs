//! Application state management

use crate::theme::Theme;
use platter_core::{DeckState, ScratchState};
use platter_input::Mode;

/// Message type for colored status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Transport snapshot (updated every frame)
    pub deck: DeckState,
    /// Scratch engine snapshot (updated every frame)
    pub scratch: ScratchState,
    /// Platter angle in degrees as drawn
    pub platter_angle: f32,

    pub mode: Mode,
    /// Path typed at the open prompt
    pub path_buffer: String,
    /// Track currently being decoded
    pub loading: Option<String>,

    pub show_help: bool,
    pub help_scroll: u16,

    pub theme: Theme,

    pub message: Option<String>,
    pub message_type: MessageType,

    pub frame_count: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take fresh snapshots from the engine
    ///
    /// While the platter is held or coasting it turns with the tracked
    /// rotation; otherwise it turns with playback at 33⅓ rpm scaled by the rate.
    pub fn update(&mut self, deck: DeckState, scratch: ScratchState, frame_secs: f32) {
        const COAST_VISIBLE: f32 = 0.01;
        const DEGREES_PER_SEC: f32 = 33.333 / 60.0 * 360.0;

        let spinning = scratch.dragging || scratch.combined_speed > COAST_VISIBLE;
        if spinning {
            self.platter_angle +=
                scratch.rotation.rotation_degrees - self.scratch.rotation.rotation_degrees;
        } else if scratch.is_playing {
            self.platter_angle += DEGREES_PER_SEC * deck.rate * frame_secs;
        }
        self.platter_angle = self.platter_angle.rem_euclid(360.0);
        self.deck = deck;
        self.scratch = scratch;
        self.frame_count = self.frame_count.wrapping_add(1);
    }

    /// Set current mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode != Mode::Open {
            self.path_buffer.clear();
        }
    }

    /// Toggle help display
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    pub fn help_scroll_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(3);
    }

    pub fn help_scroll_down(&mut self) {
        self.help_scroll = self.help_scroll.saturating_add(3);
    }

    /// Set theme by name; unknown names keep the current theme
    pub fn set_theme(&mut self, name: &str) -> bool {
        match Theme::by_name(name) {
            Some(theme) => {
                self.theme = theme;
                true
            }
            None => false,
        }
    }

    /// Switch to the next theme
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.set_message(format!("Theme: {}", self.theme.name));
    }

    /// Set a message to display (info level)
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    /// Set a success message (green)
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    /// Set a warning message (yellow)
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    /// Set an error message (red)
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

/// Main application wrapper
#[derive(Debug, Default)]
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platter_core::PlaybackState;

    fn playing_deck(rate: f32) -> DeckState {
        DeckState {
            playback: PlaybackState::Playing,
            rate,
            ..Default::default()
        }
    }

    #[test]
    fn test_platter_follows_playback_when_idle() {
        let mut state = AppState::new();
        let scratch = ScratchState {
            is_playing: true,
            ..Default::default()
        };
        state.update(playing_deck(1.0), scratch, 0.5);
        assert!((state.platter_angle - 100.0).abs() < 0.1);
        assert_eq!(state.frame_count, 1);
    }

    #[test]
    fn test_platter_follows_drag() {
        let mut state = AppState::new();
        let mut scratch = ScratchState {
            dragging: true,
            ..Default::default()
        };
        scratch.rotation.rotation_degrees = 45.0;
        state.update(playing_deck(1.0), scratch, 0.5);
        assert_eq!(state.platter_angle, 45.0);
    }

    #[test]
    fn test_released_platter_coasts_with_playback_speed() {
        let mut state = AppState::new();
        let mut scratch = ScratchState {
            combined_speed: 2.0,
            ..Default::default()
        };
        scratch.rotation.rotation_degrees = 30.0;
        state.update(playing_deck(2.0), scratch, 0.5);
        assert_eq!(state.platter_angle, 30.0);
    }

    #[test]
    fn test_paused_platter_holds() {
        let mut state = AppState::new();
        state.platter_angle = 12.0;
        state.update(DeckState::default(), ScratchState::default(), 0.5);
        assert_eq!(state.platter_angle, 12.0);
    }

    #[test]
    fn test_set_theme() {
        let mut state = AppState::new();
        assert!(state.set_theme("amber"));
        assert_eq!(state.theme.name, "amber");

        assert!(!state.set_theme("plaid"));
        assert_eq!(state.theme.name, "amber");

        state.set_warning("Unknown theme: plaid");
        assert_eq!(state.message_type, MessageType::Warning);
    }

    #[test]
    fn test_cycle_theme_and_help() {
        let mut state = AppState::new();
        state.cycle_theme();
        assert_eq!(state.theme.name, "amber");

        state.help_scroll = 9;
        state.toggle_help();
        assert!(state.show_help);
        assert_eq!(state.help_scroll, 0);
    }

    #[test]
    fn test_leaving_open_mode_clears_buffer() {
        let mut state = AppState::new();
        state.set_mode(Mode::Open);
        state.path_buffer.push_str("/tmp");
        state.set_mode(Mode::Normal);
        assert!(state.path_buffer.is_empty());
    }
}
