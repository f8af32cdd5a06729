//! Default timings and file names for configuration records.
//!
//! # Design
//! - Centralize defaults so the loader, the CLI, and tests agree on them.
//! - Keep time-based defaults explicit for auditability.

use std::time::Duration;

/// File name of the persisted settings document.
pub const CONFIG_FILE_NAME: &str = "unspool.conf";
/// Environment variable that overrides the settings document location.
pub const CONFIG_PATH_ENV: &str = "UNSPOOL_CONFIG";
/// Interval between two size samples while waiting for a download to settle.
pub const STABILITY_INTERVAL: Duration = Duration::from_millis(500);
/// Upper bound on how long a file may keep growing before it is skipped.
pub const STABILITY_TIMEOUT: Duration = Duration::from_secs(10);
/// Extra pause after the size settled, absorbing metadata flush lag.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
