// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;

mod app;
mod config;
mod data;
mod events;
mod monitor;
mod probe;
mod ui;

use app::{App, View};
use config::MonitorConfig;
use monitor::Monitor;
use probe::Metric;

#[derive(Parser, Debug)]
#[command(name = "netpulse")]
#[command(about = "Continuous network-quality telemetry monitor with a live TUI")]
struct Args {
    /// Target host to probe
    #[arg(long)]
    host: Option<String>,

    /// Echo requests per probe round
    #[arg(long)]
    count: Option<u32>,

    /// Seconds between probe rounds
    #[arg(long)]
    interval: Option<u64>,

    /// Upper bound in seconds on one probe round
    #[arg(long)]
    timeout: Option<u64>,

    /// Seconds of history kept for live display
    #[arg(long)]
    window: Option<u64>,

    /// Seconds between durable rollups
    #[arg(long)]
    rollup_interval: Option<u64>,

    /// Directory for rollup CSV files and the session log
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Optional config file (TOML), overridden by the flags above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UI refresh interval in seconds
    #[arg(short, long, default_value = "1")]
    refresh: u64,

    /// Run without the TUI, logging each sample to stderr
    #[arg(long)]
    headless: bool,

    /// Export the final window snapshots to a JSON file on exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("cannot create log dir {}", config.log_dir.display()))?;
    init_tracing(&config, args.headless)?;

    let rt = tokio::runtime::Runtime::new()?;

    // Background sampling cycles need the runtime context to spawn.
    let mut monitors = {
        let _guard = rt.enter();
        let mut monitors = vec![
            Monitor::new(Metric::Jitter, &config),
            Monitor::new(Metric::PacketLoss, &config),
        ];
        for monitor in &mut monitors {
            monitor.start()?;
        }
        monitors
    };

    let handles = monitors.iter().map(|m| m.handle()).collect::<Vec<_>>();
    let mut app = App::new(handles, config.host.clone(), config.window());

    let result = if args.headless {
        run_headless(&rt)
    } else {
        run_tui(&mut app, Duration::from_secs(args.refresh.max(1)))
    };

    // Cooperative stop; a crashed cycle is surfaced here as an error.
    let stop_result = rt.block_on(async {
        for monitor in &mut monitors {
            monitor.stop().await?;
        }
        Ok::<(), anyhow::Error>(())
    });

    if let Some(ref export_path) = args.export {
        app.refresh();
        app.export_state(export_path)?;
        info!(path = %export_path.display(), "exported final snapshots");
    }

    result.and(stop_result)
}

/// Layer CLI flags over the file/default configuration.
fn build_config(args: &Args) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load(args.config.as_deref())?;

    if let Some(ref host) = args.host {
        config.host = host.clone();
    }
    if let Some(count) = args.count {
        config.probe_count = count;
    }
    if let Some(interval) = args.interval {
        config.probe_interval_secs = interval;
    }
    if let Some(timeout) = args.timeout {
        config.probe_timeout_secs = timeout;
    }
    if let Some(window) = args.window {
        config.window_secs = window;
    }
    if let Some(rollup) = args.rollup_interval {
        config.rollup_interval_secs = rollup;
    }
    if let Some(ref dir) = args.log_dir {
        config.log_dir = dir.clone();
    }

    Ok(config)
}

/// Set up the tracing subscriber.
///
/// In TUI mode logs go to a file so they cannot corrupt the alternate
/// screen; headless mode logs to stderr.
fn init_tracing(config: &MonitorConfig, headless: bool) -> Result<()> {
    if headless {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(io::stderr)
            .init();
    } else {
        let path = config.log_dir.join("netpulse.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}

/// Run without the TUI until interrupted; the monitors log each sample.
fn run_headless(rt: &tokio::runtime::Runtime) -> Result<()> {
    info!("running headless, press Ctrl-C to stop");
    rt.block_on(async {
        tokio::signal::ctrl_c().await?;
        Ok::<(), anyhow::Error>(())
    })?;
    info!("interrupt received, shutting down");
    Ok(())
}

/// Run the TUI render loop on the main thread.
fn run_tui(app: &mut App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    app.refresh();
    let result = run_app(&mut terminal, app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 50;
    const MIN_HEIGHT: u16 = 10;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Overview => ui::chart::render_overview(frame, app, chunks[2]),
                View::Jitter => ui::chart::render_metric(frame, app, Metric::Jitter, chunks[2]),
                View::PacketLoss => {
                    ui::chart::render_metric(frame, app, Metric::PacketLoss, chunks[2])
                }
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Pull fresh snapshots periodically
        if last_refresh.elapsed() >= refresh_interval {
            app.refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
