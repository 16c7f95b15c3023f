//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::probe::Metric;

/// Rough quality banding for a metric reading, used only for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Good,
    Degraded,
    Bad,
}

impl Quality {
    /// Band a reading. Jitter in ms, loss in percent.
    pub fn of(metric: Metric, value: f64) -> Self {
        match metric {
            Metric::Jitter => {
                if value >= 30.0 {
                    Quality::Bad
                } else if value >= 10.0 {
                    Quality::Degraded
                } else {
                    Quality::Good
                }
            }
            Metric::PacketLoss => {
                if value >= 5.0 {
                    Quality::Bad
                } else if value > 0.0 {
                    Quality::Degraded
                } else {
                    Quality::Good
                }
            }
        }
    }
}

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for degraded readings.
    pub warning: Color,
    /// Color for bad readings.
    pub critical: Color,
    /// Color for good readings.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Series color for the jitter chart.
    pub jitter_series: Color,
    /// Series color for the packet-loss chart.
    pub loss_series: Color,
    /// Style for header text.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            jitter_series: Color::Cyan,
            loss_series: Color::Magenta,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            jitter_series: Color::Blue,
            loss_series: Color::Magenta,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a metric reading, banded by quality.
    pub fn reading_style(&self, metric: Metric, value: f64) -> Style {
        match Quality::of(metric, value) {
            Quality::Good => Style::default().fg(self.healthy),
            Quality::Degraded => Style::default().fg(self.warning),
            Quality::Bad => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Series color for a metric's chart.
    pub fn series_color(&self, metric: Metric) -> Color {
        match metric {
            Metric::Jitter => self.jitter_series,
            Metric::PacketLoss => self.loss_series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_bands() {
        assert_eq!(Quality::of(Metric::Jitter, 2.0), Quality::Good);
        assert_eq!(Quality::of(Metric::Jitter, 15.0), Quality::Degraded);
        assert_eq!(Quality::of(Metric::Jitter, 40.0), Quality::Bad);
        assert_eq!(Quality::of(Metric::PacketLoss, 0.0), Quality::Good);
        assert_eq!(Quality::of(Metric::PacketLoss, 1.0), Quality::Degraded);
        assert_eq!(Quality::of(Metric::PacketLoss, 20.0), Quality::Bad);
    }
}
