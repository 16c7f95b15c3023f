//! Terminal rendering using ratatui.
//!
//! - [`common`]: header bar, tab bar, status bar, help overlay
//! - [`chart`]: time-series charts for the live sample windows
//! - [`theme`]: light/dark theme with terminal auto-detection

pub mod chart;
pub mod common;
pub mod theme;

pub use theme::{Quality, Theme};
