//! One-shot batch extraction of every archive already in the monitored folder.

use std::thread::{self, JoinHandle};

use tracing::{info, info_span};
use unspool_ingest::{BatchSummary, CancellationToken, Dispatcher};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Handle to a running batch.
#[derive(Debug)]
pub struct BatchJob {
    id: Uuid,
    token: CancellationToken,
    worker: JoinHandle<BatchSummary>,
}

impl BatchJob {
    /// Run `dispatcher` over the monitored folder, observing `token`.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker thread cannot be spawned.
    pub fn spawn(mut dispatcher: Dispatcher, token: CancellationToken) -> AppResult<Self> {
        let id = Uuid::new_v4();
        let worker_token = token.clone();
        let worker = thread::Builder::new()
            .name("unspool-batch".to_string())
            .spawn(move || {
                let span = info_span!("batch", job = %id);
                let _entered = span.enter();
                let summary = dispatcher.run_batch(&worker_token);
                info!(
                    found = summary.found,
                    processed = summary.processed,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    cancelled = summary.cancelled,
                    "batch finished"
                );
                summary
            })
            .map_err(|err| AppError::io("batch.spawn", None, err))?;
        Ok(Self { id, token, worker })
    }

    /// Identifier of this run.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Token observed by the run; cancelling any clone stops it.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Ask the run to stop at the next checkpoint.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the worker has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the run ends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::WorkerPanicked`] if the worker thread panicked.
    pub fn wait(self) -> AppResult<BatchSummary> {
        self.worker
            .join()
            .map_err(|_| AppError::WorkerPanicked { worker: "batch" })
    }
}
