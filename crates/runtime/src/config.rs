use std::time::Duration;

use anyhow::{Context, Result};

pub const PROGRAM_NAME: &str = "batch";
pub const PROGRAM_LOG_LEVEL: &str = "BATCH_LOG_LEVEL";

/// Overrides the default queue capacity.
pub const CAPACITY_ENV: &str = "BATCH_CAPACITY";
/// Overrides the default flush interval, in milliseconds.
pub const FLUSH_INTERVAL_ENV: &str = "BATCH_FLUSH_INTERVAL_MS";

/// Maximum number of items buffered between two flushes.
pub const DEFAULT_CAPACITY: usize = 1024;

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Sleep between two drain checks while waiting for the queue to empty.
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub const WORKER_THREAD_NAME: &str = "batch-flush";

/// Read a non-negative integer from `var`.
///
/// Unset or empty variables yield `Ok(None)`; anything else must parse.
pub(crate) fn env_usize(var: &str) -> Result<Option<usize>> {
    match std::env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .with_context(|| format!("{var}={raw:?} is not a non-negative integer")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {var}")),
    }
}

pub fn capacity_from_env() -> Result<Option<usize>> {
    env_usize(CAPACITY_ENV)
}

pub fn flush_interval_from_env() -> Result<Option<Duration>> {
    Ok(env_usize(FLUSH_INTERVAL_ENV)?.map(|ms| Duration::from_millis(ms as u64)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
