//! Durable long-term averages of the sample window.
//!
//! On a fixed cadence (default once a day) the monitor reduces the current
//! window to its mean and appends one record to a CSV log. Records are
//! append-only: the file is created with a header on first write and a single
//! row is appended per rollup, so write cost stays constant as history grows.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

/// One persisted rollup: when it was taken and the window average at that
/// instant. Never mutated or deleted after being written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollupRecord {
    pub at: DateTime<Utc>,
    pub average: f64,
}

/// Append-only CSV log of rollup records for one metric.
///
/// The file carries the header `timestamp,<column>` followed by one
/// ISO-8601 timestamp and floating-point average per row.
#[derive(Debug)]
pub struct RollupLog {
    path: PathBuf,
    column: &'static str,
    interval: Duration,
    last_rollup: DateTime<Utc>,
}

impl RollupLog {
    /// Create a log writing to `path`. The first rollup becomes due one full
    /// `interval` after construction.
    pub fn new(path: impl Into<PathBuf>, column: &'static str, interval: StdDuration) -> Self {
        Self::starting_at(path, column, interval, Utc::now())
    }

    /// Like [`RollupLog::new`] with an explicit session start, for callers
    /// that need deterministic scheduling.
    pub fn starting_at(
        path: impl Into<PathBuf>,
        column: &'static str,
        interval: StdDuration,
        started: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            column,
            interval: Duration::from_std(interval).unwrap_or(Duration::MAX),
            last_rollup: started,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a rollup is due at `now`.
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        now - self.last_rollup >= self.interval
    }

    /// Persist a rollup of the window mean computed by the caller.
    ///
    /// Returns the record on success, or `None` when nothing was due or the
    /// window was empty. The rollup timer is only reset on success (or an
    /// empty window), so a failed write is retried on the next cycle rather
    /// than waiting out another full interval.
    pub fn commit(
        &mut self,
        now: DateTime<Utc>,
        window_mean: Option<f64>,
    ) -> Result<Option<RollupRecord>> {
        if !self.due(now) {
            return Ok(None);
        }

        let Some(average) = window_mean else {
            // Nothing retained to aggregate; skip this interval.
            self.last_rollup = now;
            return Ok(None);
        };

        let record = RollupRecord { at: now, average };
        self.append_record(&record)
            .with_context(|| format!("failed to append rollup to {}", self.path.display()))?;
        self.last_rollup = now;
        Ok(Some(record))
    }

    fn append_record(&self, record: &RollupRecord) -> Result<()> {
        let write_header = !self.path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if write_header {
            writeln!(file, "timestamp,{}", self.column)?;
        }
        writeln!(
            file,
            "{},{:.3}",
            record.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.average
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn fires_only_after_interval_elapses() {
        let dir = tempdir().unwrap();
        let mut log = RollupLog::starting_at(
            dir.path().join("jitter_rollups.csv"),
            "avg_jitter",
            StdDuration::from_secs(60),
            at(0),
        );

        assert!(!log.due(at(59)));
        assert_eq!(log.commit(at(59), Some(4.0)).unwrap(), None);

        assert!(log.due(at(60)));
        let record = log.commit(at(60), Some(4.0)).unwrap().unwrap();
        assert_eq!(record.average, 4.0);

        // Timer reset: not due again until another full interval.
        assert!(!log.due(at(61)));
        assert!(log.due(at(120)));
    }

    #[test]
    fn appends_header_once_then_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("packet_loss_rollups.csv");
        let mut log = RollupLog::starting_at(
            &path,
            "avg_packet_loss",
            StdDuration::from_secs(10),
            at(0),
        );

        log.commit(at(10), Some(20.0)).unwrap();
        log.commit(at(20), Some(0.0)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,avg_packet_loss");
        assert!(lines[1].ends_with(",20.000"));
        assert!(lines[2].ends_with(",0.000"));
        // ISO-8601 timestamps
        assert!(lines[1].contains('T') && lines[1].contains('Z'));
    }

    #[test]
    fn empty_window_skips_record_but_resets_timer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jitter_rollups.csv");
        let mut log =
            RollupLog::starting_at(&path, "avg_jitter", StdDuration::from_secs(10), at(0));

        assert_eq!(log.commit(at(10), None).unwrap(), None);
        assert!(!path.exists());
        assert!(!log.due(at(11)));
    }

    #[test]
    fn failed_write_leaves_timer_armed() {
        // A directory path makes the file open fail.
        let dir = tempdir().unwrap();
        let mut log = RollupLog::starting_at(
            dir.path().to_path_buf(),
            "avg_jitter",
            StdDuration::from_secs(10),
            at(0),
        );

        assert!(log.commit(at(10), Some(1.0)).is_err());
        // Still due: the next cycle retries instead of waiting out an interval.
        assert!(log.due(at(11)));
    }
}
