//! Active probing against a target host.
//!
//! A probe is one round of `ping` invocations whose textual output is parsed
//! into a single metric value. Probes are deliberately lenient: any failure
//! to launch the process, a timeout, or output that matches nothing degrades
//! to a value of 0.0 with a logged warning. The monitor never stops because
//! of a single bad probe.

pub mod parse;

use std::fmt::Debug;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

/// Which network-quality metric a probe derives from ping output.
///
/// Both metrics share the same probing and windowing machinery; this enum
/// carries the per-metric variation (parse rule, labels, log column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean absolute difference between consecutive round-trip times (ms).
    Jitter,
    /// Percentage of echo requests that received no reply.
    PacketLoss,
}

impl Metric {
    /// Display label for headers and chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Jitter => "Jitter",
            Metric::PacketLoss => "Packet loss",
        }
    }

    /// Unit suffix for display.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Jitter => "ms",
            Metric::PacketLoss => "%",
        }
    }

    /// Column name used in the rollup CSV header.
    pub fn csv_column(&self) -> &'static str {
        match self {
            Metric::Jitter => "avg_jitter",
            Metric::PacketLoss => "avg_packet_loss",
        }
    }

    /// File name of the durable rollup log for this metric.
    pub fn rollup_file_name(&self) -> &'static str {
        match self {
            Metric::Jitter => "jitter_rollups.csv",
            Metric::PacketLoss => "packet_loss_rollups.csv",
        }
    }

    /// Derive this metric's value from one round of ping output.
    ///
    /// A parse miss is logged and yields 0.0, matching the lenient-failure
    /// policy of the whole probing layer.
    pub fn derive(&self, output: &str) -> f64 {
        match self {
            Metric::Jitter => {
                let latencies = parse::extract_latencies(output);
                if latencies.is_empty() {
                    warn!(metric = self.label(), "no latency values in probe output");
                } else if latencies.len() < 2 {
                    debug!(
                        metric = self.label(),
                        "single latency value, recording zero jitter"
                    );
                }
                parse::mean_abs_delta(&latencies)
            }
            Metric::PacketLoss => parse::packet_loss_percent(output).unwrap_or_else(|| {
                warn!(metric = self.label(), "no packet-loss summary in probe output");
                0.0
            }),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One probing round producing a metric value.
///
/// Implementations must never fail outward; internal failures degrade to a
/// value of 0.0 plus a logged warning.
#[async_trait]
pub trait Prober: Send + Sync + Debug {
    /// Perform one probe round and return the derived metric value.
    async fn probe(&self) -> f64;

    /// The metric this prober derives.
    fn metric(&self) -> Metric;
}

/// A prober that shells out to the platform `ping` utility.
///
/// Unix form `ping -c <count> <host>`, windows form `ping -n <count> <host>`;
/// combined stdout/stderr is parsed as text. The invocation is bounded by an
/// explicit timeout so a hung ping cannot stall the sampling cycle.
#[derive(Debug, Clone)]
pub struct PingProber {
    metric: Metric,
    host: String,
    count: u32,
    timeout: Duration,
}

impl PingProber {
    pub fn new(metric: Metric, host: impl Into<String>, count: u32, timeout: Duration) -> Self {
        Self {
            metric,
            host: host.into(),
            count,
            timeout,
        }
    }

    /// The host this prober targets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run the ping process and return its combined stdout/stderr.
    ///
    /// A nonzero exit status is not an error here: ping exits nonzero on
    /// total loss while still printing the summary we parse.
    async fn run_ping(&self) -> Result<String> {
        let mut cmd = Command::new("ping");

        #[cfg(windows)]
        cmd.arg("-n");
        #[cfg(not(windows))]
        cmd.arg("-c");

        cmd.arg(self.count.to_string())
            .arg(&self.host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| anyhow!("ping timed out after {:?}", self.timeout))?
            .context("failed to launch ping")?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self) -> f64 {
        match self.run_ping().await {
            Ok(output) => self.metric.derive(&output),
            Err(e) => {
                warn!(
                    metric = self.metric.label(),
                    host = %self.host,
                    error = %e,
                    "probe failed, recording 0"
                );
                0.0
            }
        }
    }

    fn metric(&self) -> Metric {
        self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_labels_and_columns() {
        assert_eq!(Metric::Jitter.csv_column(), "avg_jitter");
        assert_eq!(Metric::PacketLoss.csv_column(), "avg_packet_loss");
        assert_eq!(Metric::Jitter.unit(), "ms");
        assert_eq!(Metric::PacketLoss.unit(), "%");
    }

    #[test]
    fn derive_jitter_from_output() {
        let out = "time=10 ms\ntime=15 ms\ntime=12 ms\n";
        assert_eq!(Metric::Jitter.derive(out), 4.0);
    }

    #[test]
    fn derive_jitter_insufficient_samples_is_zero() {
        assert_eq!(Metric::Jitter.derive("time=10 ms\n"), 0.0);
        assert_eq!(Metric::Jitter.derive("garbage"), 0.0);
    }

    #[test]
    fn derive_loss_from_summary() {
        let out = "10 packets transmitted, 8 received, 20% packet loss";
        assert_eq!(Metric::PacketLoss.derive(out), 20.0);
    }

    #[test]
    fn derive_loss_missing_summary_is_zero() {
        assert_eq!(Metric::PacketLoss.derive("nothing useful"), 0.0);
    }

    #[tokio::test]
    async fn unlaunchable_probe_degrades_to_zero() {
        // A host name ping cannot resolve still produces output; to exercise
        // the launch-failure path we use an absurdly short timeout instead.
        let prober = PingProber::new(
            Metric::Jitter,
            "192.0.2.1",
            1,
            Duration::from_nanos(1),
        );
        assert_eq!(prober.probe().await, 0.0);
    }
}
