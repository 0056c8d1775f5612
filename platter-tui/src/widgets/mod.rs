//! Custom widgets for the Platter TUI

mod platter;
mod readout;
pub mod status_bar;

pub use platter::{marker_end, PlatterWidget};
pub use readout::{format_rate, format_time, meter_bar, ReadoutWidget};
pub use status_bar::{HelpWidget, StatusBarWidget};
