use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::info;
use unspool_app::Monitor;
use unspool_ingest::{SharedSink, TracingSink};
use unspool_telemetry::GlobalContextGuard;

use crate::cli::CliContext;
use crate::commands::{build_dispatcher, init_logging, load_config};
use crate::error::{CliError, CliResult};

pub(crate) async fn handle_watch(ctx: &CliContext) -> CliResult<()> {
    let config = load_config(ctx)?;
    init_logging(ctx)?;
    let _context = GlobalContextGuard::new("watch");

    let sink: SharedSink = Arc::new(TracingSink);
    let dispatcher = build_dispatcher(ctx, config, Arc::clone(&sink))?;
    let monitor = Monitor::start_with(dispatcher, sink).map_err(CliError::failure)?;
    println!(
        "Watching {} (press Ctrl-C to stop)",
        monitor.folder().display()
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")
        .map_err(CliError::failure)?;
    info!("stop requested");

    let processed = tokio::task::spawn_blocking(move || monitor.stop())
        .await
        .map_err(|err| CliError::failure(anyhow!("monitor shutdown failed: {err}")))?
        .map_err(CliError::failure)?;
    println!("Processed {processed} archive(s).");
    Ok(())
}
