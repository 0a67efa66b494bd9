use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xmrwatch::export::write_export;
use xmrwatch::setup::{self, setup_instances};
use xmrwatch::ui::{self, Theme};
use xmrwatch::{events, App, CliInstance, Settings, TuiHost};
use xmrwatch_adapters::{Fetcher, HttpFetcher};

/// Per-request HTTP timeout, kept below the refresh interval.
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Default redraw interval in milliseconds.
const DEFAULT_UI_REFRESH_MS: u64 = 250;

/// Redraw at least this often so relative times stay current.
const MAX_FRAME_AGE: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "xmrwatch")]
#[command(about = "Terminal dashboard for polling XMRig miner APIs")]
struct Args {
    /// Config file listing [[instances]] (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the instance given with --address
    #[arg(short, long, requires = "address")]
    name: Option<String>,

    /// Base address of a miner API, e.g. http://127.0.0.1:8080
    #[arg(short, long)]
    address: Option<String>,

    /// Bearer token for the instance given with --address
    #[arg(short, long, requires = "address")]
    token: Option<String>,

    /// Refresh every instance once, export state to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log file used while the terminal UI is running
    #[arg(long, default_value = "xmrwatch.log")]
    log_file: PathBuf,

    /// Redraw interval in milliseconds
    #[arg(long)]
    ui_refresh: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cli = CliInstance {
        name: args.name,
        address: args.address,
        token: args.token,
    };
    let settings = Settings::load(args.config.as_deref(), cli)?;

    // The terminal UI owns stdout, so log to a file unless exporting
    match args.export {
        Some(_) => init_logging(None)?,
        None => init_logging(Some(&args.log_file))?,
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::builder().timeout(FETCH_TIMEOUT).build()?);
    let host = Arc::new(TuiHost::new());

    let (instances, rejected) =
        runtime.block_on(setup_instances(settings.instances, fetcher, host.clone()));
    info!("{} instance(s) accepted, {} rejected", instances.len(), rejected.len());

    if let Some(export_path) = args.export {
        return export_once(&runtime, &instances, &host, &export_path);
    }

    if instances.is_empty() {
        bail!(
            "No instance passed setup validation; see {}",
            args.log_file.display()
        );
    }

    runtime.block_on(setup::start(&instances));

    let ui_refresh = Duration::from_millis(
        args.ui_refresh
            .or(settings.ui_refresh_ms)
            .unwrap_or(DEFAULT_UI_REFRESH_MS),
    );

    let mut app = App::new(instances, rejected, host, runtime.handle().clone())
        .with_theme(Theme::auto_detect());
    let result = run_tui(&mut app, ui_refresh);

    app.shutdown();
    info!("shut down");

    result
}

/// Install the tracing subscriber, writing to `log_file` or stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Refresh every instance once and write the export document.
fn export_once(
    runtime: &tokio::runtime::Runtime,
    instances: &[setup::Instance],
    host: &TuiHost,
    export_path: &Path,
) -> Result<()> {
    runtime.block_on(async {
        for instance in instances {
            let outcome = instance.controller.refresh().await;
            info!("{}: {:?}", instance.name(), outcome);
        }
    });

    let result = write_export(instances, host, export_path);
    setup::shutdown(instances);
    result?;

    println!("Exported miner state to: {}", export_path.display());
    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App, ui_refresh: Duration) -> Result<()> {
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
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app, ui_refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ui_refresh: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 10;

    let mut needs_draw = true;
    let mut last_draw = Instant::now();

    while app.running {
        if needs_draw || app.take_dirty() || last_draw.elapsed() >= MAX_FRAME_AGE {
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
                    let top = (area.height / 2).saturating_sub(2);
                    let centered =
                        ratatui::layout::Rect::new(0, top, area.width, 5u16.min(area.height - top));
                    frame.render_widget(paragraph, centered);
                    return;
                }

                let chunks = Layout::vertical([
                    Constraint::Length(1), // Header bar
                    Constraint::Length(1), // Instance tabs
                    Constraint::Min(6),    // Metric table
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

                ui::common::render_header(frame, app, chunks[0]);
                ui::common::render_tabs(frame, app, chunks[1]);
                ui::summary::render(frame, app, chunks[2]);
                ui::common::render_status_bar(frame, app, chunks[3]);

                if app.show_help {
                    ui::common::render_help(frame, app, area);
                }
            })?;
            needs_draw = false;
            last_draw = Instant::now();
        }

        if let Some(event) = events::poll_event(ui_refresh)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
            needs_draw = true;
        }
    }

    Ok(())
}
