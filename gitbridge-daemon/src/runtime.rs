use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use gitbridge_core::{Cancellation, Settings};
use gitbridge_sync::{scan_cycle_with, CycleReport, DirectoryOutcome, SyncEngine};

use crate::error::{io_err, DaemonError};

/// Output format for the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Start the scheduler and block the current thread until it exits.
pub fn start_blocking(settings: Settings, format: LogFormat) -> Result<(), DaemonError> {
    init_tracing(format);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    runtime.block_on(run(settings))
}

/// Run scan cycles every `check_interval` until SIGINT/SIGTERM.
///
/// A job in flight when the signal arrives runs to completion; no further
/// directory or cycle is started afterwards.
pub async fn run(settings: Settings) -> Result<(), DaemonError> {
    if let Err(err) = settings.validate_compiles_dir() {
        tracing::error!(error = %err, "cannot start");
        return Err(err.into());
    }
    if settings.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; only public repositories can be synced");
    }
    ensure_workspace_root(&settings.workspace_root)?;

    tracing::info!(
        compiles_dir = %settings.compiles_dir.display(),
        interval_secs = settings.check_interval.as_secs(),
        "starting gitbridge",
    );

    let cancellation = Cancellation::new();
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);

    let signal_handle = {
        let cancellation = cancellation.clone();
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = wait_for_shutdown_signal().await;
            match &result {
                Ok(()) => tracing::info!("shutdown signal received, finishing current job"),
                Err(err) => tracing::error!(error = %err, "signal handler failed, stopping"),
            }
            cancellation.cancel();
            let _ = shutdown.send(());
            result
        })
    };

    let engine = Arc::new(SyncEngine::new(settings));
    let result = poll_loop(engine, cancellation, shutdown_rx).await;

    signal_handle.abort();
    drop(shutdown_tx);
    tracing::info!("gitbridge stopped");
    result
}

async fn poll_loop(
    engine: Arc<SyncEngine>,
    cancellation: Cancellation,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let interval = engine.settings().check_interval;

    while !cancellation.is_cancelled() {
        tracing::info!("scanning for projects to sync...");
        let report = run_cycle(engine.clone(), cancellation.clone()).await?;
        log_report(&report);

        if cancellation.is_cancelled() {
            break;
        }
        tracing::info!(
            next_check_secs = interval.as_secs(),
            "scan complete, waiting for next check"
        );
        if !wait_for_next_cycle(interval, &mut shutdown_rx).await {
            break;
        }
    }
    Ok(())
}

async fn run_cycle(
    engine: Arc<SyncEngine>,
    cancellation: Cancellation,
) -> Result<CycleReport, DaemonError> {
    let task = tokio::task::spawn_blocking(move || {
        scan_cycle_with(&engine, &cancellation, |folder, outcome| match outcome {
            DirectoryOutcome::NoDescriptor => {}
            DirectoryOutcome::Synced(report) => tracing::debug!(
                folder = %folder,
                duration_ms = report.duration.as_millis() as u64,
                "folder synced"
            ),
            DirectoryOutcome::Invalid(_) | DirectoryOutcome::Failed(_) => {
                tracing::debug!(folder = %folder, "folder not synced")
            }
        })
    });
    task.await.map_err(|err| DaemonError::Join {
        task: "scan_cycle",
        message: err.to_string(),
    })
}

/// Sleep for `interval`, returning early (with `false`) on shutdown.
async fn wait_for_next_cycle(
    interval: Duration,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = shutdown_rx.recv() => false,
    }
}

fn log_report(report: &CycleReport) {
    tracing::info!(
        pushed = report.pushed.len(),
        unchanged = report.unchanged.len(),
        failed = report.failed.len(),
        invalid = report.invalid.len(),
        skipped = report.skipped.len(),
        duration_ms = report.duration_ms as u64,
        interrupted = report.interrupted,
        "cycle finished",
    );
    for failure in &report.failed {
        tracing::warn!(
            folder = %failure.folder,
            stage = ?failure.stage,
            error = %failure.error,
            "sync failed; will retry next cycle",
        );
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<(), DaemonError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map_err(DaemonError::Signal),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<(), DaemonError> {
    tokio::signal::ctrl_c().await.map_err(DaemonError::Signal)
}

fn ensure_workspace_root(root: &Path) -> Result<(), DaemonError> {
    if !root.exists() {
        std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
    }
    Ok(())
}

/// Install the global fmt subscriber on stderr (`RUST_LOG`, default `info`).
///
/// Records from the `log` facade are forwarded too. Safe to call twice.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
