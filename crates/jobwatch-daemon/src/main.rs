mod events;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use jobwatch::{init_logging, AppContext, IntakeError, JobwatchError};
use log::{error, info, warn};
use tokio::sync::{oneshot, Notify};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("jobwatch-daemon failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), JobwatchError> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = state::load_daemon_config(config_path.as_deref())?;

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting jobwatch daemon v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::initialize(config)?;
    let outcome_logger = events::spawn_outcome_logger(ctx.subscribe_outcomes());

    let interrupted = Arc::new(Notify::new());
    let shutdown = ctx.intake().shutdown_handle();
    let on_interrupt = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown.shutdown();
        on_interrupt.notify_one();
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    // A plain thread so a read blocked on stdin cannot hold up exit.
    let submitter = ctx.intake().submitter();
    let (read_tx, read_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let stats = events::read_events(stdin.lock(), &submitter);
            let _ = read_tx.send(stats);
        })
        .map_err(|e| IntakeError::SpawnFailed(e.to_string()))?;

    tokio::select! {
        stats = read_rx => match stats {
            Ok(stats) => info!(
                "Input closed: {} events submitted, {} skipped",
                stats.submitted, stats.skipped
            ),
            Err(_) => error!("Stdin reader exited without reporting"),
        },
        _ = interrupted.notified() => info!("Interrupted, stopping intake"),
    }

    let board = match tokio::task::spawn_blocking(move || ctx.finish()).await {
        Ok(board) => board,
        Err(e) => {
            error!("Intake shutdown task failed: {}", e);
            return Ok(());
        }
    };

    if let Err(e) = outcome_logger.await {
        warn!("Outcome logger task failed: {}", e);
    }

    let unread = board.unread_count().load().await?;
    info!("Shutdown complete, {} unread postings", unread);

    Ok(())
}
