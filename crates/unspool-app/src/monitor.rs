//! Live-mode folder monitor.
//!
//! # Design
//! - A non-recursive `notify` watcher feeds a channel; one worker thread owns
//!   the [`Dispatcher`] and handles events one at a time.
//! - The worker polls with a bounded timeout so clearing the running flag
//!   stops it promptly even when the folder is quiet.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};
use unspool_config::IngestConfig;
use unspool_ingest::{Dispatcher, SharedSink, WatchEvent};

use crate::error::{AppError, AppResult};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Entry point for live monitoring.
#[derive(Debug, Clone, Copy)]
pub struct Monitor;

impl Monitor {
    /// Start watching `config.monitor_folder` on a dedicated worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination folder cannot be prepared, the
    /// watcher cannot be attached, or the worker thread cannot be spawned.
    pub fn start(config: IngestConfig, sink: SharedSink) -> AppResult<MonitorHandle> {
        let dispatcher = Dispatcher::new(config, Arc::clone(&sink))
            .map_err(|err| AppError::ingest("monitor.dispatcher", err))?;
        Self::start_with(dispatcher, sink)
    }

    /// Start watching with a prepared dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error when the watcher cannot be attached or the worker
    /// thread cannot be spawned.
    pub fn start_with(dispatcher: Dispatcher, sink: SharedSink) -> AppResult<MonitorHandle> {
        let folder = dispatcher.config().monitor_folder.clone();
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())
            .map_err(|err| AppError::watch("monitor.watcher", &folder, err))?;
        watcher
            .watch(&folder, RecursiveMode::NonRecursive)
            .map_err(|err| AppError::watch("monitor.watch", &folder, err))?;

        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);
        let worker = thread::Builder::new()
            .name("unspool-monitor".to_string())
            .spawn(move || run_worker(dispatcher, &rx, &worker_running))
            .map_err(|err| AppError::io("monitor.spawn", Some(folder.clone()), err))?;

        sink.write_line(&format!("Started monitoring: {}", folder.display()));
        info!(folder = %folder.display(), "monitor started");
        Ok(MonitorHandle {
            folder,
            running,
            watcher: Some(watcher),
            worker: Some(worker),
            sink,
        })
    }
}

/// Running monitor; stopping joins the worker.
pub struct MonitorHandle {
    folder: PathBuf,
    running: Arc<AtomicBool>,
    watcher: Option<RecommendedWatcher>,
    worker: Option<JoinHandle<usize>>,
    sink: SharedSink,
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("folder", &self.folder)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl MonitorHandle {
    /// Folder being watched.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Whether the worker is still accepting events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self
                .worker
                .as_ref()
                .is_some_and(|worker| !worker.is_finished())
    }

    /// Stop watching and wait for the archive in flight, if any.
    ///
    /// Returns how many archives the monitor processed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::WorkerPanicked`] if the worker thread panicked.
    pub fn stop(mut self) -> AppResult<usize> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> AppResult<usize> {
        self.running.store(false, Ordering::SeqCst);
        drop(self.watcher.take());
        let Some(worker) = self.worker.take() else {
            return Ok(0);
        };
        let processed = worker
            .join()
            .map_err(|_| AppError::WorkerPanicked { worker: "monitor" })?;
        self.sink.write_line("Stopped monitoring.");
        info!(folder = %self.folder.display(), processed, "monitor stopped");
        Ok(processed)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if self.worker.is_none() {
            return;
        }
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "monitor shutdown failed");
        }
    }
}

fn run_worker(
    mut dispatcher: Dispatcher,
    events: &Receiver<notify::Result<Event>>,
    running: &AtomicBool,
) -> usize {
    while running.load(Ordering::SeqCst) {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => {
                for watch_event in translate(&event) {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    let outcome = dispatcher.handle_event(&watch_event);
                    debug!(event = ?watch_event, outcome = ?outcome, "watch event handled");
                }
            }
            Ok(Err(err)) => warn!(error = %err, "filesystem watch error"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    dispatcher.processed_count()
}

/// Map a raw `notify` event onto the ingestion core's event vocabulary.
///
/// Only creations and rename targets matter. Each move is reported once,
/// through the event naming its target.
pub(crate) fn translate(event: &Event) -> Vec<WatchEvent> {
    match event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .cloned()
            .map(WatchEvent::Created)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => event
            .paths
            .iter()
            .cloned()
            .map(|to| WatchEvent::Renamed { from: None, to })
            .collect(),
        // Paired `Both` renames are skipped; their target also arrives as `To`.
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};

    #[test]
    fn creations_become_created_events() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/in/a.zip"));
        assert_eq!(
            translate(&event),
            vec![WatchEvent::Created(PathBuf::from("/in/a.zip"))]
        );
    }

    #[test]
    fn paired_renames_are_left_to_their_target_event() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/in/a.zip.part"))
            .add_path(PathBuf::from("/in/a.zip"));
        assert!(translate(&event).is_empty());
    }

    #[test]
    fn rename_targets_without_source_are_reported() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(PathBuf::from("/in/b.rar"));
        assert_eq!(
            translate(&event),
            vec![WatchEvent::Renamed {
                from: None,
                to: PathBuf::from("/in/b.rar"),
            }]
        );
    }

    #[test]
    fn other_events_are_dropped() {
        let from = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path(PathBuf::from("/in/a.zip"));
        let data = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/in/a.zip"));
        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/in/a.zip"));
        assert!(translate(&from).is_empty());
        assert!(translate(&data).is_empty());
        assert!(translate(&removed).is_empty());
    }
}
