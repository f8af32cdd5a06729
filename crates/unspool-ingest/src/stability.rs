//! Download stability gate.
//!
//! An archive is only opened once its size has been observed unchanged across
//! consecutive samples. Sampling failures reset the comparison. Time is read
//! through a [`Clock`] so the gate can be driven deterministically.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

/// Equal comparisons of consecutive samples needed before a file counts as
/// stable. One comparison spans two samples.
const REQUIRED_EQUAL_COMPARISONS: u32 = 1;

/// Source of time for the stability gate and settle delay.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `std`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Polls a file's size until it stops changing.
#[derive(Clone)]
pub struct StabilityDetector {
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl fmt::Debug for StabilityDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StabilityDetector")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl StabilityDetector {
    /// Detector sampling every `interval` on `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self { clock, interval }
    }

    /// Wait until the size of `path` is stable, giving up after `timeout`.
    #[must_use]
    pub fn await_stable(&self, path: &Path, timeout: Duration) -> bool {
        self.await_stable_with(|| fs::metadata(path).map(|meta| meta.len()), timeout)
    }

    /// Same as [`Self::await_stable`] with a caller-supplied size reader.
    pub fn await_stable_with<F>(&self, mut read_size: F, timeout: Duration) -> bool
    where
        F: FnMut() -> io::Result<u64>,
    {
        let started = self.clock.now();
        let mut previous: Option<u64> = None;
        let mut matches = 0_u32;

        while self.clock.now().saturating_duration_since(started) < timeout {
            match read_size() {
                Ok(size) => {
                    if previous == Some(size) {
                        matches += 1;
                        if matches >= REQUIRED_EQUAL_COMPARISONS {
                            return true;
                        }
                    } else {
                        matches = 0;
                    }
                    previous = Some(size);
                }
                Err(err) => {
                    trace!(error = %err, "size read failed; resetting stability window");
                    matches = 0;
                    previous = None;
                }
            }
            self.clock.sleep(self.interval);
        }
        false
    }
}
