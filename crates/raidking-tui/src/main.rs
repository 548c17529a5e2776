//! Raid King - a terminal roster for suicide king loot ordering.
//!
//! Keeps one or more raid tables per guild, tracks who is present, absent or
//! missing for the night, and moves looters to the back of the line.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use raidking_core::{Config, EnrichedRaidMember, JsonStore};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside `<data dir>/logs`
const LOG_FILE_PREFIX: &str = "raidking";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file in the data
/// directory. The returned guard must live until exit or buffered lines are lost.
fn init_tracing(data_dir: &Path) -> Result<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&log_dir)
        .with_context(|| format!("Failed to open log directory: {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // A broken config file should not lock anyone out of their roster
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let data_dir = config.data_dir()?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--export" {
        return export_tables(&data_dir);
    }

    // Initialize logging
    let _log_guard = init_tracing(&data_dir)?;
    info!(data_dir = %data_dir.display(), "Raid King starting");
    if let Some(e) = config_error {
        warn!(error = %e, "Ignoring unreadable config");
    }

    // Open the store before touching the terminal so errors print normally
    let store = JsonStore::open(&data_dir)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Let the writer finish anything still queued
    app.shutdown().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Raid King shutting down");
    Ok(())
}

/// One raid table as written by `--export`
#[derive(Serialize)]
struct ExportedTable {
    name: String,
    members: Vec<EnrichedRaidMember>,
}

/// Print every raid table, in order, to stdout as JSON. Never writes.
fn export_tables(data_dir: &Path) -> Result<()> {
    let guild = JsonStore::load(data_dir)?;

    let tables: Vec<ExportedTable> = guild
        .tables
        .iter()
        .map(|table| ExportedTable {
            name: table.name.clone(),
            members: guild.members_for(&table.id),
        })
        .collect();

    let json = serde_json::to_string_pretty(&tables)?;
    println!("{}", json);

    eprintln!(
        "Exported {} tables, {} players.",
        tables.len(),
        guild.players.len()
    );
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed saves
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
