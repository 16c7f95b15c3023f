//! Extraction of latency and loss figures from raw ping output.
//!
//! Both unix and windows `ping` variants are handled: latency indicators
//! appear as `time=23.4 ms` or `time<1ms`, and the summary line reports
//! `20% packet loss` (unix) or `20% loss` wording that still contains the
//! percentage we match on.

use std::sync::OnceLock;

use regex::Regex;

/// Per-reply round-trip time, e.g. `time=23.4 ms` or `time<1ms`.
fn latency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"time[=<](\d+\.?\d*)\s*ms").expect("latency regex"))
}

/// Summary percentage, e.g. `20% packet loss`.
fn loss_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)%\s*packet\s*loss").expect("loss regex"))
}

/// Extract every per-reply round-trip time from a probe's output, in order.
///
/// Captures that fail to parse as a float are skipped rather than erroring;
/// a garbled line should not discard the rest of the round.
pub fn extract_latencies(output: &str) -> Vec<f64> {
    latency_re()
        .captures_iter(output)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Mean absolute difference between consecutive values.
///
/// Fewer than two values yields 0.0: a single reply gives no variation to
/// measure, and the monitor records that as zero jitter rather than an error.
pub fn mean_abs_delta(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    sum / (values.len() - 1) as f64
}

/// Extract the packet-loss percentage from a probe's summary line.
///
/// Returns `None` when no summary matched so the caller can log the miss.
pub fn packet_loss_percent(output: &str) -> Option<f64> {
    loss_re()
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OUTPUT: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=10 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=117 time=15 ms
64 bytes from 8.8.8.8: icmp_seq=3 ttl=117 time=12 ms

--- 8.8.8.8 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 10.012/12.338/15.021/2.049 ms";

    const WINDOWS_OUTPUT: &str = "\
Pinging 8.8.8.8 with 32 bytes of data:
Reply from 8.8.8.8: bytes=32 time=23ms TTL=117
Reply from 8.8.8.8: bytes=32 time<1ms TTL=117

Ping statistics for 8.8.8.8:
    Packets: Sent = 2, Received = 2, Lost = 0 (0% loss),";

    #[test]
    fn extracts_latencies_with_equals_and_less_than() {
        assert_eq!(extract_latencies(LINUX_OUTPUT), vec![10.0, 15.0, 12.0]);
        assert_eq!(extract_latencies(WINDOWS_OUTPUT), vec![23.0, 1.0]);
    }

    #[test]
    fn extracts_fractional_latencies() {
        let out = "time=10.5 ms\ntime=12.25 ms\n";
        assert_eq!(extract_latencies(out), vec![10.5, 12.25]);
    }

    #[test]
    fn no_latencies_in_unreachable_output() {
        let out = "ping: connect: Network is unreachable";
        assert!(extract_latencies(out).is_empty());
    }

    #[test]
    fn jitter_is_mean_of_consecutive_deltas() {
        // |15-10| = 5, |12-15| = 3 -> mean 4.0
        assert_eq!(mean_abs_delta(&[10.0, 15.0, 12.0]), 4.0);
    }

    #[test]
    fn jitter_is_zero_below_two_values() {
        assert_eq!(mean_abs_delta(&[]), 0.0);
        assert_eq!(mean_abs_delta(&[42.0]), 0.0);
    }

    #[test]
    fn parses_packet_loss_summary() {
        let out = "10 packets transmitted, 8 received, 20% packet loss, time 9012ms";
        assert_eq!(packet_loss_percent(out), Some(20.0));
    }

    #[test]
    fn packet_loss_match_is_case_insensitive() {
        assert_eq!(packet_loss_percent("5% Packet Loss"), Some(5.0));
    }

    #[test]
    fn missing_loss_summary_is_none() {
        assert_eq!(packet_loss_percent("no summary here"), None);
    }
}
