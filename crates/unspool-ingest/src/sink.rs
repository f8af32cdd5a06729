//! Destinations for human-readable progress lines.
//!
//! # Design
//! - Every stage reports through a [`LogSink`] so front-ends decide where lines go.
//! - Writes are line-atomic; concurrent writers never interleave within a line.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Receiver of progress and error lines.
pub trait LogSink: Send + Sync {
    /// Record one complete line.
    fn write_line(&self, line: &str);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn LogSink>;

/// Forwards lines to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, line: &str) {
        info!(target: "unspool::activity", "{line}");
    }
}

/// Keeps lines in memory, for tests and embedding front-ends.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines in write order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any recorded line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|line| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
pub(crate) mod test_sink {
    use super::{LogSink, MemorySink};

    type Action = Box<dyn Fn() + Send + Sync>;

    /// Records lines and runs an action after every line containing `trigger`.
    pub(crate) struct OnLineSink {
        pub(crate) lines: MemorySink,
        trigger: &'static str,
        action: Action,
    }

    impl OnLineSink {
        pub(crate) fn new(
            trigger: &'static str,
            action: impl Fn() + Send + Sync + 'static,
        ) -> Self {
            Self {
                lines: MemorySink::new(),
                trigger,
                action: Box::new(action),
            }
        }
    }

    impl LogSink for OnLineSink {
        fn write_line(&self, line: &str) {
            self.lines.write_line(line);
            if line.contains(self.trigger) {
                (self.action)();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn memory_sink_keeps_whole_lines_across_threads() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for index in 0..25 {
                        sink.write_line(&format!("worker {worker} line {index}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().is_ok());
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 100);
        assert!(lines.iter().all(|line| line.starts_with("worker ")));
        assert!(sink.contains("worker 3 line 24"));
    }

    #[test]
    fn shared_sink_forwards_through_arc() {
        let memory = Arc::new(MemorySink::new());
        let shared: SharedSink = memory.clone();
        shared.write_line("hello");
        TracingSink.write_line("ignored by memory");
        assert_eq!(memory.lines(), vec!["hello".to_string()]);
    }
}
