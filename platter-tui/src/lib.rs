//! Terminal UI for Platter - widgets, themes, and layout
//!
//! Provides a vintage CRT-style turntable in the terminal.

mod app;
mod theme;
pub mod widgets;

pub use app::{App, AppState, MessageType};
pub use theme::{Theme, CRT_AMBER, CRT_GREEN, CYBERPUNK, THEMES};
pub use widgets::{format_time, HelpWidget, PlatterWidget, ReadoutWidget, StatusBarWidget};
