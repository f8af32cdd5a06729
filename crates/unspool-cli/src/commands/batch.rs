use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};
use unspool_app::BatchJob;
use unspool_ingest::{BatchSummary, CancellationToken, Dispatcher, SharedSink, TracingSink};
use unspool_telemetry::GlobalContextGuard;

use crate::cli::{CliContext, OutputFormat};
use crate::commands::{build_dispatcher, init_logging, load_config};
use crate::error::{CliError, CliResult};
use crate::output::render_batch_summary;

pub(crate) async fn handle_batch(ctx: &CliContext, format: OutputFormat) -> CliResult<()> {
    let config = load_config(ctx)?;
    init_logging(ctx)?;
    let _context = GlobalContextGuard::new("batch");

    let sink: SharedSink = Arc::new(TracingSink);
    let dispatcher = build_dispatcher(ctx, config, sink)?;
    let summary = run_until_interrupted(dispatcher, tokio::signal::ctrl_c()).await?;
    render_batch_summary(&summary, format)
}

/// Run one batch, cancelling it when `interrupt` resolves first.
pub(crate) async fn run_until_interrupted<F>(
    dispatcher: Dispatcher,
    interrupt: F,
) -> CliResult<BatchSummary>
where
    F: Future<Output = io::Result<()>>,
{
    let job = BatchJob::spawn(dispatcher, CancellationToken::new()).map_err(CliError::failure)?;
    info!(job = %job.id(), "batch started");
    let token = job.token();
    let mut waiting = tokio::task::spawn_blocking(move || job.wait());
    tokio::pin!(interrupt);

    let joined = tokio::select! {
        joined = &mut waiting => joined,
        signal = &mut interrupt => {
            match signal {
                Ok(()) => {
                    info!("batch cancellation requested");
                    token.cancel();
                }
                Err(err) => warn!(error = %err, "failed to listen for Ctrl-C"),
            }
            waiting.await
        }
    };

    joined
        .map_err(|err| CliError::failure(anyhow!("batch worker join failed: {err}")))?
        .map_err(CliError::failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use unspool_config::IngestConfig;
    use unspool_ingest::MemorySink;
    use unspool_test_support::fixtures::{IngestWorkspace, write_zip_archive};

    #[tokio::test]
    async fn uninterrupted_batch_processes_every_archive() -> Result<()> {
        let workspace = IngestWorkspace::new()?;
        write_zip_archive(
            &workspace.monitor().join("one.zip"),
            &[("one/a.txt", b"a".as_slice())],
        )?;
        write_zip_archive(
            &workspace.monitor().join("two.zip"),
            &[("two/b.txt", b"b".as_slice())],
        )?;
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new(
            IngestConfig::new(workspace.monitor(), workspace.destination()),
            sink.clone(),
        )?;

        let summary = run_until_interrupted(dispatcher, std::future::pending())
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        assert_eq!(summary.found, 2);
        assert_eq!(summary.processed, 2);
        assert!(!summary.cancelled);
        assert!(workspace.destination().join("a.txt").is_file());
        assert!(workspace.destination().join("b.txt").is_file());
        assert!(sink.contains("Extraction of all archives complete."));
        Ok(())
    }

    #[tokio::test]
    async fn failed_interrupt_listener_lets_the_batch_finish() -> Result<()> {
        let workspace = IngestWorkspace::new()?;
        write_zip_archive(
            &workspace.monitor().join("one.zip"),
            &[("one/a.txt", b"a".as_slice())],
        )?;

        let dispatcher = Dispatcher::new(
            IngestConfig::new(workspace.monitor(), workspace.destination()),
            Arc::new(MemorySink::new()),
        )?;

        let summary = run_until_interrupted(dispatcher, async {
            Err(io::Error::other("no signal handler"))
        })
        .await
        .map_err(|err| anyhow!(err.display_message()))?;

        assert_eq!(summary.processed, 1);
        assert!(!summary.cancelled);
        Ok(())
    }
}
