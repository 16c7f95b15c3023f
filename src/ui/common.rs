//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::probe::Metric;

/// Render the header bar with the latest reading for each metric.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" NETPULSE ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(format!("probing {} ", app.target_host)),
        Span::raw("│ "),
    ];

    for metric in [Metric::Jitter, Metric::PacketLoss] {
        let Some(series) = app.series_for(metric) else {
            continue;
        };
        spans.push(Span::raw(format!("{}: ", metric.label())));
        match series.latest {
            Some(value) => spans.push(Span::styled(
                format!("{:.2}{}", value, metric.unit()),
                app.theme.reading_style(metric, value),
            )),
            None => spans.push(Span::styled(
                "--",
                Style::default().add_modifier(Modifier::DIM),
            )),
        }
        spans.push(Span::raw(" │ "));
    }

    spans.push(Span::raw(format!("window {}s", app.window.as_secs())));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Overview "),
        Line::from(" 2:Jitter "),
        Line::from(" 3:Packet loss "),
    ];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Jitter => 1,
        View::PacketLoss => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows sample counts, session age, and available controls. Temporary
/// status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let samples: usize = app.series.iter().map(|s| s.samples.len()).sum();
    let session_secs = (chrono::Utc::now() - app.session_started).num_seconds();

    let status = format!(
        " {} | {} samples in window | session {}s | Tab:switch e:export ?:help q:quit",
        app.current_view.label(),
        samples,
        session_secs,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Views",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab / ←→ h/l   Switch views"),
        Line::from("  1              Overview"),
        Line::from("  2              Jitter"),
        Line::from("  3              Packet loss"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh snapshots"),
        Line::from("  e         Export to JSON"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
