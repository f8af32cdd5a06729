use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::monitor::Monitor;
use tracing::info;
use unspool_config::{IngestConfig, read_config_file, resolve_config_path};
use unspool_ingest::{SharedSink, TracingSink};
use unspool_telemetry::{GlobalContextGuard, LoggingConfig};

/// Dependencies required to bootstrap the unspool daemon.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    config_path: PathBuf,
    config: IngestConfig,
    sink: SharedSink,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let logging = LoggingConfig::default();
        let config_path = resolve_config_path();
        let config = read_config_file(&config_path)
            .map_err(|err| AppError::config("config.read", err))?;
        config
            .validate()
            .map_err(|err| AppError::config("config.validate", err))?;
        Ok(Self {
            logging,
            config_path,
            config,
            sink: Arc::new(TracingSink),
        })
    }
}

/// Entry point for the unspool daemon boot sequence.
///
/// Watches the configured folder until `ctrl_c`.
///
/// # Errors
///
/// Returns an error if configuration loading, logging setup, or monitor
/// startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    unspool_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", format!("{err:#}")))?;
    let _context = GlobalContextGuard::new("watch");
    run_app_with(dependencies, shutdown_signal()).await?;
    Ok(())
}

/// Monitor until `shutdown` resolves, then stop and report the processed count.
pub(crate) async fn run_app_with<F>(
    dependencies: BootstrapDependencies,
    shutdown: F,
) -> AppResult<usize>
where
    F: Future<Output = AppResult<()>>,
{
    info!(
        config = %dependencies.config_path.display(),
        "unspool daemon starting"
    );

    let BootstrapDependencies {
        logging: _,
        config_path: _,
        config,
        sink,
    } = dependencies;

    let monitor = Monitor::start(config, sink)?;
    let signal = shutdown.await;
    info!("shutdown requested");

    let processed = tokio::task::spawn_blocking(move || monitor.stop())
        .await
        .map_err(|_| AppError::WorkerPanicked { worker: "monitor" })??;
    info!(processed, "unspool daemon stopped");
    signal?;
    Ok(processed)
}

async fn shutdown_signal() -> AppResult<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::io("signal.ctrl_c", None, err))
}
