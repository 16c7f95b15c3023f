// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # netpulse
//!
//! A continuous network-quality telemetry monitor with a live TUI.
//!
//! netpulse repeatedly probes a remote host with the platform `ping`
//! utility, derives quality metrics (jitter, packet loss) from the probe
//! output, keeps a bounded recent-history window in memory, periodically
//! rolls the window up into a durable long-term average, and renders the
//! live series in a terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Monitor (background task, one per metric)                   │
//! │  ┌────────┐   ┌──────────────┐   ┌───────────┐               │
//! │  │ probe  │──▶│ SampleWindow │──▶│ RollupLog │──▶ CSV file   │
//! │  │ (ping) │   │  (sliding)   │   │ (append)  │               │
//! │  └────────┘   └──────┬───────┘   └───────────┘               │
//! └──────────────────────┼───────────────────────────────────────┘
//!                        │ snapshot() each tick
//!                        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  App (render consumer)  ──▶  ui  ──▶  Terminal               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`probe`]**: the [`Prober`] trait and ping-based implementation,
//!   plus the [`Metric`] enum carrying per-metric variation
//! - **[`data`]**: the sliding [`SampleWindow`] and append-only [`RollupLog`]
//! - **[`monitor`]**: the [`Monitor`] orchestrator owning the sampling
//!   cycle's lifecycle, and the read-only [`MonitorHandle`] for consumers
//! - **[`app`]**: render-consumer state, view navigation, JSON export
//! - **[`ui`]**: terminal rendering using ratatui
//! - **[`config`]**: defaults, config-file layering, CLI overrides
//!
//! ## Usage as a library
//!
//! ```no_run
//! use netpulse::{Metric, Monitor, MonitorConfig};
//!
//! # tokio_test::block_on(async {
//! let config = MonitorConfig::default();
//! let mut monitor = Monitor::new(Metric::Jitter, &config);
//! let handle = monitor.handle();
//!
//! monitor.start()?;
//! // ... render handle.snapshot() on your own schedule ...
//! monitor.stop().await?;
//! # Ok::<(), anyhow::Error>(())
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod monitor;
pub mod probe;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::MonitorConfig;
pub use data::{RollupLog, RollupRecord, Sample, SampleWindow};
pub use monitor::{Monitor, MonitorHandle, MonitorState};
pub use probe::{Metric, PingProber, Prober};
