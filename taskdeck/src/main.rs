//! `Taskdeck` — terminal client for the task server.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Connect to a local server on the default port
//! cargo run --bin taskdeck
//!
//! # Connect elsewhere
//! cargo run --bin taskdeck -- --server-url http://192.168.1.20:3000
//!
//! # Or via environment variable
//! TASKDECK_URL=http://192.168.1.20:3000 cargo run --bin taskdeck
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::api::HttpTaskApi;
use taskdeck::app::App;
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::sync::{self, SyncCommand, SyncEvent};
use taskdeck::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Logs go to a file, never stdout, since ratatui owns the terminal.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let api = match HttpTaskApi::new(&config.server_url, config.request_timeout) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(server = %api.base_url(), "taskdeck starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, api, &config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdeck exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown so that
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: HttpTaskApi,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new();
    let (cmd_tx, mut evt_rx, worker) = sync::spawn_sync(api, config.channel_capacity);

    let initial = app.start();
    dispatch(&mut app, &cmd_tx, initial);

    loop {
        // Step 1: Draw the UI frame.
        let today = chrono::Local::now().date_naive();
        terminal.draw(|frame| ui::draw(frame, &app, today))?;

        // Step 2: Apply all pending sync results (non-blocking).
        drain_sync_events(&mut app, &mut evt_rx);

        // Step 3: Poll for terminal input events. Polling blocks this
        // thread, so let the worker run in the meantime.
        let polled = tokio::task::block_in_place(|| event::poll(config.poll_timeout))?;
        if polled
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(cmd) = app.handle_key_event(key)
        {
            dispatch(&mut app, &cmd_tx, cmd);
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(SyncCommand::Shutdown);
            drop(cmd_tx);
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "sync worker ended abnormally");
            }
            return Ok(());
        }
    }
}

/// Queue a command for the sync worker, reporting a full or closed channel.
fn dispatch(app: &mut App, tx: &mpsc::Sender<SyncCommand>, cmd: SyncCommand) {
    match tx.try_send(cmd) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            app.command_not_sent(&cmd, "Busy, try again in a moment");
        }
        Err(mpsc::error::TrySendError::Closed(cmd)) => {
            app.command_not_sent(&cmd, "Sync worker stopped");
        }
    }
}

/// Drain all pending `SyncEvent`s and apply them to the app.
fn drain_sync_events(app: &mut App, rx: &mut mpsc::Receiver<SyncEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.apply_sync_event(event);
    }
}
