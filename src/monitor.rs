//! Monitor orchestration: the background sampling cycle.
//!
//! A [`Monitor`] owns one metric's cycle: probe, append to the window,
//! attempt a rollup, sleep. The cycle runs as a tokio task; `stop()` sets a
//! cooperative cancellation signal and waits for the current iteration to
//! finish. Cancellation is not mid-probe-preemptive: an in-flight ping runs
//! to completion (bounded by the probe timeout) before the flag is observed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::data::{RollupLog, Sample, SampleWindow};
use crate::probe::{Metric, PingProber, Prober};

/// Lifecycle state of a monitor.
///
/// `Stopped → Running → Stopping → Stopped`; a stopped instance cannot be
/// restarted, a fresh [`Monitor`] is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Running,
    Stopping,
}

/// Read-only handle to a monitor's sample window for the render consumer.
///
/// Cheap to clone; every accessor takes the window lock only long enough to
/// copy, so readers never observe a partially-applied append.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    metric: Metric,
    window: Arc<Mutex<SampleWindow>>,
}

impl MonitorHandle {
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Ordered copy of the current window contents.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.window.lock().unwrap().snapshot()
    }

    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<Sample> {
        self.window.lock().unwrap().latest()
    }

    /// Mean over the current window contents.
    pub fn mean(&self) -> Option<f64> {
        self.window.lock().unwrap().mean()
    }
}

/// Owns the sampling loop for one metric.
pub struct Monitor {
    metric: Metric,
    prober: Arc<dyn Prober>,
    window: Arc<Mutex<SampleWindow>>,
    /// Moved into the task on start.
    rollup: Option<RollupLog>,
    probe_interval: Duration,
    state: MonitorState,
    spent: bool,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Build a monitor for `metric` using the platform ping prober.
    pub fn new(metric: Metric, config: &MonitorConfig) -> Self {
        let prober = Arc::new(PingProber::new(
            metric,
            config.host.clone(),
            config.probe_count,
            config.probe_timeout(),
        ));
        let rollup = RollupLog::new(
            config.log_dir.join(metric.rollup_file_name()),
            metric.csv_column(),
            config.rollup_interval(),
        );
        Self::with_prober(prober, config.window(), config.probe_interval(), rollup)
    }

    /// Build a monitor around an arbitrary prober. Used by tests and by any
    /// caller that wants a probing mechanism other than ping.
    pub fn with_prober(
        prober: Arc<dyn Prober>,
        window: Duration,
        probe_interval: Duration,
        rollup: RollupLog,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            metric: prober.metric(),
            prober,
            window: Arc::new(Mutex::new(SampleWindow::new(window))),
            rollup: Some(rollup),
            probe_interval,
            state: MonitorState::Stopped,
            spent: false,
            shutdown,
            task: None,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// A read handle for the render consumer.
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            metric: self.metric,
            window: self.window.clone(),
        }
    }

    /// True when the cycle terminated on its own while still marked Running,
    /// i.e. the loop body panicked. Surfaced fully by [`Monitor::stop`].
    pub fn cycle_crashed(&self) -> bool {
        self.state == MonitorState::Running
            && self.task.as_ref().is_some_and(|t| t.is_finished())
    }

    /// Begin the sampling cycle on the tokio runtime.
    ///
    /// Only valid from `Stopped`, and only once per instance.
    pub fn start(&mut self) -> Result<()> {
        if self.state != MonitorState::Stopped {
            bail!("{} monitor is already running", self.metric);
        }
        if self.spent {
            bail!(
                "{} monitor cannot be restarted; create a fresh instance",
                self.metric
            );
        }

        let mut rollup = self
            .rollup
            .take()
            .with_context(|| format!("{} monitor has no rollup log", self.metric))?;
        let prober = self.prober.clone();
        let window = self.window.clone();
        let interval = self.probe_interval;
        let metric = self.metric;
        let mut shutdown = self.shutdown.subscribe();

        self.task = Some(tokio::spawn(async move {
            info!(metric = %metric, "sampling cycle started");
            loop {
                if *shutdown.borrow() {
                    break;
                }

                // Blocking for the duration of the (timeout-bounded) probe;
                // cancellation is observed at the next iteration boundary.
                let value = prober.probe().await;
                let sample = Sample::now(value);
                info!(metric = %metric, value, "sample recorded");
                window.lock().unwrap().append(sample);

                let now = Utc::now();
                if rollup.due(now) {
                    let mean = window.lock().unwrap().mean();
                    match rollup.commit(now, mean) {
                        Ok(Some(record)) => {
                            info!(
                                metric = %metric,
                                average = record.average,
                                path = %rollup.path().display(),
                                "rollup persisted"
                            );
                        }
                        Ok(None) => {}
                        Err(e) => {
                            // Lenient: the window still holds the samples and
                            // the next cycle retries.
                            warn!(metric = %metric, error = %e, "rollup write failed");
                        }
                    }
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown.changed() => break,
                }
            }
            info!(metric = %metric, "sampling cycle stopped");
        }));

        self.state = MonitorState::Running;
        Ok(())
    }

    /// Cooperatively stop the cycle and wait for it to finish.
    ///
    /// Returns an error if the cycle crashed (panicked) instead of exiting at
    /// an iteration boundary; that is the one fatal condition this crate does
    /// not absorb. Idempotent once stopped.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state == MonitorState::Stopped {
            return Ok(());
        }
        self.state = MonitorState::Stopping;
        let _ = self.shutdown.send(true);

        let result = match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| anyhow!("{} monitor cycle crashed: {e}", self.metric)),
            None => Ok(()),
        };

        self.state = MonitorState::Stopped;
        self.spent = true;
        result
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("metric", &self.metric)
            .field("state", &self.state)
            .field("probe_interval", &self.probe_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// Prober returning a fixed value without touching the network.
    #[derive(Debug)]
    struct FixedProber {
        metric: Metric,
        value: f64,
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self) -> f64 {
            self.value
        }

        fn metric(&self) -> Metric {
            self.metric
        }
    }

    /// Prober that panics, to exercise fatal-crash surfacing.
    #[derive(Debug)]
    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self) -> f64 {
            panic!("probe blew up");
        }

        fn metric(&self) -> Metric {
            Metric::Jitter
        }
    }

    fn test_rollup(dir: &std::path::Path, interval: Duration) -> RollupLog {
        RollupLog::new(dir.join("jitter_rollups.csv"), "avg_jitter", interval)
    }

    fn test_monitor(dir: &std::path::Path, rollup_interval: Duration) -> Monitor {
        Monitor::with_prober(
            Arc::new(FixedProber {
                metric: Metric::Jitter,
                value: 4.0,
            }),
            Duration::from_secs(30),
            Duration::from_millis(10),
            test_rollup(dir, rollup_interval),
        )
    }

    #[tokio::test]
    async fn cycle_appends_samples_until_stopped() {
        let dir = tempdir().unwrap();
        let mut monitor = test_monitor(dir.path(), Duration::from_secs(3600));
        let handle = monitor.handle();

        monitor.start().unwrap();
        assert_eq!(monitor.state(), MonitorState::Running);

        tokio::time::sleep(Duration::from_millis(80)).await;
        monitor.stop().await.unwrap();
        assert_eq!(monitor.state(), MonitorState::Stopped);

        let appended = handle.snapshot().len();
        assert!(appended >= 2, "expected several samples, got {appended}");
        assert!(handle.snapshot().iter().all(|s| s.value == 4.0));

        // No further appends after stop() returns.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.snapshot().len(), appended);
    }

    #[tokio::test]
    async fn stopped_monitor_cannot_restart() {
        let dir = tempdir().unwrap();
        let mut monitor = test_monitor(dir.path(), Duration::from_secs(3600));

        monitor.start().unwrap();
        assert!(monitor.start().is_err(), "double start must fail");
        monitor.stop().await.unwrap();
        assert!(monitor.start().is_err(), "restart must fail");
    }

    #[tokio::test]
    async fn stop_before_start_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut monitor = test_monitor(dir.path(), Duration::from_secs(3600));
        monitor.stop().await.unwrap();
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn rollups_are_written_during_the_cycle() {
        let dir = tempdir().unwrap();
        // Zero interval: a rollup is due on every cycle.
        let mut monitor = test_monitor(dir.path(), Duration::from_secs(0));

        monitor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        monitor.stop().await.unwrap();

        let content =
            std::fs::read_to_string(dir.path().join("jitter_rollups.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,avg_jitter");
        assert!(lines.len() >= 2);
        // Every persisted average reflects the all-4.0 window.
        assert!(lines[1..].iter().all(|l| l.ends_with(",4.000")));
    }

    #[tokio::test]
    async fn crashed_cycle_is_surfaced_by_stop() {
        let dir = tempdir().unwrap();
        let mut monitor = Monitor::with_prober(
            Arc::new(PanickingProber),
            Duration::from_secs(30),
            Duration::from_millis(10),
            test_rollup(dir.path(), Duration::from_secs(3600)),
        );

        monitor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(monitor.cycle_crashed());

        let err = monitor.stop().await.unwrap_err();
        assert!(err.to_string().contains("crashed"));
    }

    #[tokio::test]
    async fn handle_reads_are_coherent_while_running() {
        let dir = tempdir().unwrap();
        let mut monitor = test_monitor(dir.path(), Duration::from_secs(3600));
        let handle = monitor.handle();

        monitor.start().unwrap();
        for _ in 0..10 {
            let snap = handle.snapshot();
            assert!(snap.windows(2).all(|w| w[0].at <= w[1].at));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        monitor.stop().await.unwrap();
        assert_eq!(handle.mean(), Some(4.0));
    }
}
