// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod data;
mod error;
mod events;
mod notify;
mod settings;
mod source;
mod ui;

use app::App;
use data::{DeviceMonitor, MonitorConfig};
use notify::NotificationHub;
use source::{DataSource, FileSource, StreamSource};

#[derive(Parser, Debug)]
#[command(name = "device-doctor")]
#[command(about = "Diagnostic TUI for monitoring device health and camera frame integrity")]
struct Args {
    /// Path to a JSON device snapshot file
    #[arg(short, long, default_value = "device.json", conflicts_with_all = ["connect"])]
    file: PathBuf,

    /// Connect to a TCP endpoint streaming newline-delimited snapshots (host:port)
    #[arg(short, long, conflicts_with_all = ["file"])]
    connect: Option<String>,

    /// Config file with a [monitor] table (TOML, JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh interval in seconds (only used with --file)
    #[arg(short, long, default_value = "1")]
    refresh: u64,

    /// Number of events kept in the event stream
    #[arg(long)]
    capacity: Option<usize>,

    /// Battery percentage at or below which a battery is critical
    #[arg(long)]
    battery_critical: Option<u8>,

    /// Battery temperature (Celsius) at or above which a warning is raised
    #[arg(long)]
    temperature_warn: Option<f32>,

    /// Master volume at or above which a hearing warning is raised
    #[arg(long)]
    volume_warn: Option<f32>,

    /// Free storage ratio (0-1) at or below which storage is critical
    #[arg(long)]
    disk_critical: Option<f64>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Apply the snapshot file once, export state to JSON and exit
    #[arg(short, long, conflicts_with_all = ["connect"])]
    export: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> settings::Overrides {
        settings::Overrides {
            event_capacity: self.capacity,
            battery_critical: self.battery_critical,
            temperature_warning: self.temperature_warn,
            volume_warning: self.volume_warn,
            disk_critical_ratio: self.disk_critical,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref log_file) = args.log_file {
        init_logging(log_file)?;
    }

    let config = settings::load(args.config.as_deref(), &args.overrides())?;
    info!(?config, "loaded monitor configuration");

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&args.file, export_path, config);
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, config);
    }

    // Default: file-based mode
    run_with_file(&args.file, config, Duration::from_secs(args.refresh))
}

/// Send tracing output to `path`; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run with a file-based data source
fn run_with_file(path: &Path, config: MonitorConfig, refresh: Duration) -> Result<()> {
    let source = Box::new(FileSource::new(path));
    run_tui(source, config, refresh)
}

/// Run with a TCP stream data source
fn run_with_tcp(addr: &str, config: MonitorConfig) -> Result<()> {
    // Build a tokio runtime for the TCP connection
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                println!("Connected!");
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn DataSource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // For TCP, we poll continuously (no refresh interval needed)
    run_tui(source, config, Duration::from_millis(100))
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    config: MonitorConfig,
    refresh_interval: Duration,
) -> Result<()> {
    let monitor = DeviceMonitor::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, monitor);
    let session = app.attach_hub(NotificationHub::new());
    info!(%session, source = app.source_description(), "monitor session started");
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    app.detach_hub();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "monitor session ended with an error");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5u16.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::draw(frame, app);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1)
                    events::handle_mouse_event(app, mouse, 2);
                }
                _ => {}
            }
        }

        // Device callbacks are applied as they arrive; snapshots on the refresh tick
        app.drain_notifications();

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Apply the snapshot file once and export the resulting state
fn export_to_file(snapshot_path: &Path, export_path: &Path, config: MonitorConfig) -> Result<()> {
    let mut monitor = DeviceMonitor::new(config)?;
    let mut source = FileSource::new(snapshot_path);

    let snapshot = match source.poll() {
        Some(snapshot) => snapshot,
        None => {
            let reason = source.error().unwrap_or("no snapshot available").to_string();
            anyhow::bail!("failed to read {}: {}", snapshot_path.display(), reason);
        }
    };
    monitor.apply_snapshot(&snapshot);

    app::export_monitor(&monitor, export_path)?;
    println!("Exported device state to: {}", export_path.display());
    Ok(())
}
