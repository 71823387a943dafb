//! src/main.rs
//! ============================================================================
//! # Async TUI entry for the dusk disk-usage analyzer (ratatui)
//! - Resolves the scan target, launches the scanner and the event loop,
//!   renders via the View orchestrator

use clap::Parser;
use clap::error::ErrorKind;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dusk::config::config::Config;
use dusk::controller::actions::Action;
use dusk::controller::event_loop::{Controller, TaskResult, spawn_purgeable, spawn_scan};
use dusk::model::app_state::AppState;
use dusk::tasks::hooks::{OpsHooks, PlatformHooks};
use dusk::view::ui::View;
use dusk::Logger;
use futures::FutureExt;
use ratatui::{Terminal, backend::CrosstermBackend as Backend};
use std::io::Error;
use std::{io::Stdout, path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, MutexGuard, Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "dusk",
    version,
    disable_version_flag = true,
    about = "Interactive terminal disk-usage analyzer"
)]
struct Cli {
    /// Directory (or file) to scan.
    path: PathBuf,

    /// Print version information.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    _version: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    // --- Early: Set up logging/tracing ---
    Logger::init_tracing();
    info!("App start.");

    // --- Resolve and verify the target before touching the terminal ---
    let root: PathBuf = match std::path::absolute(&cli.path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error resolving path: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::symlink_metadata(&root) {
        eprintln!("error: {}: {e}", root.display());
        std::process::exit(1);
    }

    // --- Terminal and raw mode setup ---
    enable_raw_mode().map_err(|e: Error| {
        error!("Failed to enable raw mode: {}", e);
        e
    })?;
    let mut stdout: Stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend: Backend<Stdout> = Backend::new(stdout);
    let mut terminal: Terminal<Backend<Stdout>> = Terminal::new(backend)?;

    // --- App and controller setup ---
    let config: Arc<Config> = Arc::new(Config::from_env());
    let hooks: Arc<dyn OpsHooks> =
        Arc::new(PlatformHooks::new(config.open_timeout, config.trash_timeout));
    let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();
    let cancel = CancellationToken::new();
    let app: Arc<Mutex<AppState>> = Arc::new(Mutex::new(AppState::new(
        config.clone(),
        hooks.clone(),
        root.clone(),
        task_tx.clone(),
    )));
    let mut controller = Controller::new(app.clone(), task_rx, cancel.clone());

    // --- Kick off the scan and the purgeable-space query ---
    {
        let app: MutexGuard<'_, AppState> = app.lock().await;
        spawn_scan(
            cancel.child_token(),
            root.clone(),
            config.clone(),
            app.scanned_bytes.clone(),
            task_tx.clone(),
        );
    }
    spawn_purgeable(hooks, root, task_tx);

    // --- Ctrl+C graceful shutdown ---
    let shutdown: Arc<Notify> = Arc::new(Notify::new());
    let shutdown_clone: Arc<Notify> = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        shutdown_clone.notify_one();
    });

    // --- Main event/UI loop ---
    loop {
        // 1. Redraw only if needed (immediate mode)
        {
            let mut app: MutexGuard<'_, AppState> = app.lock().await;
            if app.redraw {
                terminal.draw(|frame| {
                    View::redraw(frame, &app);
                })?;
                app.redraw = false; // Clear after draw!
            }
        }

        // 2. Wait for the next event/tick/task and dispatch
        if let Some(action) = controller.next_action().await {
            if matches!(action, Action::Quit) {
                info!("Quit action received.");
                break;
            }
            controller.dispatch_action(action).await;
        }

        // 3. Graceful shutdown if Ctrl+C pressed
        if shutdown.notified().now_or_never().is_some() {
            info!("Shutdown signal received.");
            break;
        }
    }

    // Stop the scan and any in-flight hooks.
    cancel.cancel();

    // --- Terminal restore (even on error paths above) ---
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    info!("App exited cleanly.");
    Ok(())
}

/// Parse args with explicit exit codes: help/version exit 0, any usage
/// error (including a missing path) exits 1.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}
