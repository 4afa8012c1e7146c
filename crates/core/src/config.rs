use std::time::Duration;

use anyhow::Result;
use batch_runtime::{
    DEFAULT_CAPACITY, DEFAULT_FLUSH_INTERVAL, WAIT_POLL_INTERVAL, WORKER_THREAD_NAME,
    capacity_from_env, flush_interval_from_env,
};
use log::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatcherConfig {
    /// Upper bound on items held in the queue at once.
    pub capacity: usize,
    /// Pause between two flush invocations. Zero flushes back to back.
    pub flush_interval: Duration,
    /// Sleep between drain checks in [`crate::Batcher::wait`].
    pub poll_interval: Duration,
    /// Catch a panicking flush handler and keep the worker alive.
    ///
    /// When disabled, a panic ends the worker for good and no further
    /// flushes happen.
    pub isolate_panics: bool,
    /// Name given to the background flush thread.
    pub thread_name: String,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            poll_interval: WAIT_POLL_INTERVAL,
            isolate_panics: true,
            thread_name: WORKER_THREAD_NAME.to_owned(),
        }
    }
}

impl BatcherConfig {
    pub fn new(capacity: usize, flush_interval: Duration) -> Self {
        Self {
            capacity,
            flush_interval,
            ..Self::default()
        }
    }

    /// Defaults, overridden by `BATCH_CAPACITY` and `BATCH_FLUSH_INTERVAL_MS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(capacity) = capacity_from_env()? {
            config.capacity = capacity;
        }
        if let Some(interval) = flush_interval_from_env()? {
            config.flush_interval = interval;
        }

        Ok(config)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_isolate_panics(mut self, isolate_panics: bool) -> Self {
        self.isolate_panics = isolate_panics;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Capacity actually allocated for the queue. Zero is clamped to one.
    pub(crate) fn effective_capacity(&self) -> usize {
        if self.capacity == 0 {
            warn!("[batcher] capacity 0 is not usable, clamping to 1");
            return 1;
        }
        self.capacity
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
