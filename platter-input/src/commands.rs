//! Command definitions for Platter

use platter_core::ControlEvent;
use std::path::PathBuf;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Help overlay is showing
    Help,
    /// Typing a path to open
    Open,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Help => "HELP",
            Mode::Open => "OPEN",
        }
    }
}

/// Commands produced by the input handler
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forward to the scratch controller
    Control(ControlEvent),
    /// Load the track at this path
    Load(PathBuf),
    ToggleHelp,
    HelpScrollUp,
    HelpScrollDown,
    CycleTheme,
    Quit,
}

impl From<ControlEvent> for Command {
    fn from(event: ControlEvent) -> Self {
        Command::Control(event)
    }
}
