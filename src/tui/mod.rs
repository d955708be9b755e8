//! TUI module: Terminal User Interface using Ratatui.
//!
//! One form screen collecting the thirteen inputs and one result screen
//! with the verdict and a radial risk gauge.

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
