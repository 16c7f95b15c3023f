//! Time-series charts for the live sample windows.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::{App, MetricSeries};
use crate::probe::Metric;

/// Render both metric charts stacked.
pub fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let halves =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    render_metric(frame, app, Metric::Jitter, halves[0]);
    render_metric(frame, app, Metric::PacketLoss, halves[1]);
}

/// Render one metric's chart over the full area.
pub fn render_metric(frame: &mut Frame, app: &App, metric: Metric, area: Rect) {
    let Some(series) = app.series_for(metric) else {
        let msg = Paragraph::new(format!("{}: no monitor running", metric.label()))
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(msg, area);
        return;
    };

    let window_secs = app.window.as_secs() as f64;
    let points = series_points(series, window_secs);

    let title = match (series.latest, series.mean) {
        (Some(latest), Some(mean)) => format!(
            " {} | latest {:.2}{u} | avg {:.2}{u} | {} samples ",
            metric.label(),
            latest,
            mean,
            series.samples.len(),
            u = metric.unit(),
        ),
        _ => format!(" {} | waiting for samples ", metric.label()),
    };

    let block = Block::default()
        .title(Span::styled(title, app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if points.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let y_max = y_bound(series, metric);

    let dataset = Dataset::default()
        .name(metric.label())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.series_color(metric)))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("age (s)")
                .style(Style::default().fg(app.theme.border))
                .bounds([-window_secs, 0.0])
                .labels(vec![
                    format!("-{}", window_secs as u64),
                    format!("-{}", window_secs as u64 / 2),
                    "now".to_string(),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(metric.unit())
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, y_max])
                .labels(vec![
                    "0".to_string(),
                    format!("{:.0}", y_max / 2.0),
                    format!("{:.0}", y_max),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Convert a series into (age, value) points, newest at x = 0.
fn series_points(series: &MetricSeries, window_secs: f64) -> Vec<(f64, f64)> {
    let Some(newest) = series.samples.last() else {
        return Vec::new();
    };
    series
        .samples
        .iter()
        .map(|s| {
            let age = (newest.at - s.at).num_milliseconds() as f64 / 1000.0;
            (-age.min(window_secs), s.value)
        })
        .collect()
}

/// Upper y bound: headroom above the observed peak, with a sensible floor.
fn y_bound(series: &MetricSeries, metric: Metric) -> f64 {
    let floor = match metric {
        Metric::Jitter => 10.0,
        Metric::PacketLoss => 10.0,
    };
    match series.peak {
        Some(peak) if peak > 0.0 => (peak * 1.2).max(floor),
        _ => floor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;
    use chrono::{TimeZone, Utc};

    fn series_with(values: &[(i64, f64)]) -> MetricSeries {
        let samples: Vec<Sample> = values
            .iter()
            .map(|(t, v)| Sample::new(Utc.timestamp_opt(1_700_000_000 + t, 0).unwrap(), *v))
            .collect();
        let peak = samples.iter().map(|s| s.value).fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        });
        MetricSeries {
            metric: Metric::Jitter,
            latest: samples.last().map(|s| s.value),
            mean: None,
            peak,
            samples,
        }
    }

    #[test]
    fn points_are_anchored_at_zero_age() {
        let series = series_with(&[(0, 1.0), (5, 2.0), (10, 3.0)]);
        let points = series_points(&series, 30.0);
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], (0.0, 3.0));
        assert_eq!(points[0], (-10.0, 1.0));
    }

    #[test]
    fn empty_series_yields_no_points() {
        let series = series_with(&[]);
        assert!(series_points(&series, 30.0).is_empty());
    }

    #[test]
    fn y_bound_has_headroom_and_floor() {
        let quiet = series_with(&[(0, 0.0)]);
        assert_eq!(y_bound(&quiet, Metric::Jitter), 10.0);

        let busy = series_with(&[(0, 50.0)]);
        assert!((y_bound(&busy, Metric::Jitter) - 60.0).abs() < 1e-9);
    }
}
