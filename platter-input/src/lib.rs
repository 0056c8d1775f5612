//! Mouse and keyboard input handling for Platter
//!
//! Terminal mouse events become platter drags; keys become transport and UI
//! commands.

mod commands;
mod modal;

pub use commands::{Command, Mode};
pub use modal::{cell_center, InputHandler, CELL_ASPECT};
