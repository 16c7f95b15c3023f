//! Application state for the render consumer.
//!
//! The app polls monitor handles on a fixed tick, caches the latest window
//! snapshots, and never mutates monitor state.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::monitor::MonitorHandle;
use crate::probe::Metric;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Both metrics stacked.
    Overview,
    /// Jitter chart alone.
    Jitter,
    /// Packet-loss chart alone.
    PacketLoss,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Jitter,
            View::Jitter => View::PacketLoss,
            View::PacketLoss => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::PacketLoss,
            View::Jitter => View::Overview,
            View::PacketLoss => View::Jitter,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Jitter => "Jitter",
            View::PacketLoss => "Packet loss",
        }
    }
}

/// Cached view of one metric's window, refreshed each tick.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSeries {
    pub metric: Metric,
    pub samples: Vec<crate::data::Sample>,
    pub latest: Option<f64>,
    pub mean: Option<f64>,
    pub peak: Option<f64>,
}

impl MetricSeries {
    fn from_handle(handle: &MonitorHandle) -> Self {
        let samples = handle.snapshot();
        let latest = samples.last().map(|s| s.value);
        let mean = if samples.is_empty() {
            None
        } else {
            Some(samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64)
        };
        let peak = samples.iter().map(|s| s.value).fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        });
        Self {
            metric: handle.metric(),
            samples,
            latest,
            mean,
            peak,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    handles: Vec<MonitorHandle>,
    pub series: Vec<MetricSeries>,
    pub target_host: String,
    pub window: Duration,
    pub session_started: DateTime<Utc>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App polling the given monitor handles.
    pub fn new(handles: Vec<MonitorHandle>, target_host: String, window: Duration) -> Self {
        let series = handles.iter().map(MetricSeries::from_handle).collect();
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            handles,
            series,
            target_host,
            window,
            session_started: Utc::now(),
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Pull fresh snapshots from every monitor handle.
    pub fn refresh(&mut self) {
        self.series = self.handles.iter().map(MetricSeries::from_handle).collect();
    }

    /// The cached series for a metric, if that monitor exists.
    pub fn series_for(&self, metric: Metric) -> Option<&MetricSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current window snapshots and session statistics to JSON.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        #[derive(Serialize)]
        struct Export<'a> {
            generated_at: DateTime<Utc>,
            session_started: DateTime<Utc>,
            target_host: &'a str,
            window_secs: u64,
            metrics: Vec<MetricExport<'a>>,
        }

        #[derive(Serialize)]
        struct MetricExport<'a> {
            metric: Metric,
            unit: &'static str,
            latest: Option<f64>,
            mean: Option<f64>,
            peak: Option<f64>,
            samples: &'a [crate::data::Sample],
        }

        let export = Export {
            generated_at: Utc::now(),
            session_started: self.session_started,
            target_host: &self.target_host,
            window_secs: self.window.as_secs(),
            metrics: self
                .series
                .iter()
                .map(|s| MetricExport {
                    metric: s.metric,
                    unit: s.metric.unit(),
                    latest: s.latest,
                    mean: s.mean,
                    peak: s.peak,
                    samples: &s.samples,
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
