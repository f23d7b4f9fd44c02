use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::{Handle, Runtime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use motorwatch::{
    events, ui, App, EvaluationReport, FileSource, JsonLinesSink, ReadingSource, ReplayState,
    Replayer, Settings, SharedThresholds, WatchSink,
};

/// How often the TUI checks for input and new snapshots.
const UI_POLL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "motorwatch")]
#[command(about = "Replay recorded motor sensor data and flag overheating or abnormal vibration")]
struct Args {
    /// Recording to replay (.csv or .json)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pause between readings (e.g., "1s", "500ms"; bare numbers are milliseconds)
    #[arg(short, long)]
    interval: Option<String>,

    /// Number of readings kept for the trend charts
    #[arg(short, long)]
    window: Option<usize>,

    /// Temperature limit in °C (40-100)
    #[arg(long)]
    temp_limit: Option<f64>,

    /// Vibration amplitude limit (1.0-5.0)
    #[arg(long)]
    vib_limit: Option<f64>,

    /// Start replaying as soon as the dashboard opens
    #[arg(long, conflicts_with_all = ["headless", "export"])]
    autostart: bool,

    /// Stream snapshots to stdout as JSON lines instead of opening the dashboard
    #[arg(long, conflicts_with = "export")]
    headless: bool,

    /// Evaluate every reading without pacing, write a JSON report and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file (the dashboard otherwise discards them)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let interactive = !args.headless && args.export.is_none();
    init_logging(args.log_file.as_deref(), interactive)?;

    let settings = resolve_settings(&args)?;
    let interval = settings.interval()?;
    let source = load_source(&settings.data)?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_report(source, &settings, export_path);
    }

    let rt = Runtime::new()?;

    if args.headless {
        return rt.block_on(run_headless(source, &settings, interval));
    }

    run_tui(source, &settings, interval, rt.handle().clone(), args.autostart)
}

/// Install the tracing subscriber.
///
/// The dashboard owns the terminal, so without a log file interactive runs
/// log nowhere.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if !interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Layer command-line flags over the file/environment settings.
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref data) = args.data {
        settings.data = data.clone();
    }
    if let Some(ref interval) = args.interval {
        settings.interval = interval.clone();
    }
    if let Some(window) = args.window {
        settings.window = window;
    }
    if let Some(limit) = args.temp_limit {
        settings.temperature_limit = limit;
    }
    if let Some(limit) = args.vib_limit {
        settings.vibration_limit = limit;
    }

    let thresholds = settings.thresholds();
    if thresholds.temperature_limit != settings.temperature_limit
        || thresholds.vibration_limit != settings.vibration_limit
    {
        warn!(
            temperature_limit = thresholds.temperature_limit,
            vibration_limit = thresholds.vibration_limit,
            "configured limits out of range, clamped"
        );
    }
    Ok(settings)
}

fn load_source(path: &Path) -> Result<Arc<dyn ReadingSource>> {
    let source = FileSource::load(path)
        .with_context(|| format!("Failed to load readings from {}", path.display()))?;

    if let Some((index, reason)) = source.first_malformed() {
        warn!(
            malformed = source.malformed_count(),
            first_index = index,
            reason,
            "recording contains malformed rows; replay will halt when it reaches one"
        );
    }
    info!(source = source.description(), readings = source.len(), "recording loaded");
    Ok(Arc::new(source))
}

/// Evaluate the whole recording and write a JSON report
fn export_report(
    source: Arc<dyn ReadingSource>,
    settings: &Settings,
    export_path: &Path,
) -> Result<()> {
    let report = EvaluationReport::build(source, settings.thresholds());
    report.write_json(export_path)?;

    println!(
        "Evaluated {}/{} readings: {} normal, {} faults",
        report.summary.evaluated,
        report.summary.total,
        report.summary.normal,
        report.summary.faults
    );
    if let Some(ref reason) = report.halted {
        println!("Stopped early: {}", reason);
    }
    println!("Exported evaluation report to: {}", export_path.display());
    Ok(())
}

/// Run the replay with snapshots written to stdout until the session ends.
async fn run_headless(
    source: Arc<dyn ReadingSource>,
    settings: &Settings,
    interval: Duration,
) -> Result<()> {
    let replayer = Arc::new(Replayer::new(
        source,
        SharedThresholds::new(settings.thresholds()),
        Box::new(JsonLinesSink::stdout()),
        settings.window,
        Handle::current(),
    ));

    let on_ctrl_c = Arc::clone(&replayer);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.stop();
        }
    });

    replayer.start(interval);
    let state = replayer.wait().await;

    if state == ReplayState::Failed {
        let status = replayer.status();
        anyhow::bail!(
            "Replay failed: {}",
            status.last_error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}

/// Run the dashboard. The runtime behind `runtime` must outlive this call.
fn run_tui(
    source: Arc<dyn ReadingSource>,
    settings: &Settings,
    interval: Duration,
    runtime: Handle,
    autostart: bool,
) -> Result<()> {
    let (sink, feed) = WatchSink::create("tui");
    let replayer = Replayer::new(
        source,
        SharedThresholds::new(settings.thresholds()),
        Box::new(sink),
        settings.window,
        runtime,
    );
    let mut app = App::new(replayer, feed, interval);

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

    if autostart {
        app.start();
    }

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.refresh();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(UI_POLL)? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
