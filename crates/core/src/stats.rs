use std::sync::atomic::{AtomicUsize, Ordering};

/// Point-in-time counters of a [`crate::Batcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    /// Items accepted by `add`.
    pub accepted: usize,
    /// Items dropped by `add` because the queue was full.
    pub rejected: usize,
    /// Items pulled by flush invocations that have returned.
    pub flushed: usize,
    /// Flush invocations that have returned, panicked ones included.
    pub flushes: usize,
    /// Flush invocations whose handler panicked.
    pub failed_flushes: usize,
}

#[derive(Default)]
pub(crate) struct Counters {
    accepted: AtomicUsize,
    rejected: AtomicUsize,
    flushed: AtomicUsize,
    flushes: AtomicUsize,
    failed_flushes: AtomicUsize,
}

impl Counters {
    pub(crate) fn record_add(&self, accepted: bool) {
        let counter = if accepted {
            &self.accepted
        } else {
            &self.rejected
        };
        counter.fetch_add(1, Ordering::AcqRel);
    }

    /// Called once per flush, after the handler is done with its items.
    pub(crate) fn record_flush(&self, pulled: usize, failed: bool) {
        if failed {
            self.failed_flushes.fetch_add(1, Ordering::AcqRel);
        }
        self.flushes.fetch_add(1, Ordering::AcqRel);
        self.flushed.fetch_add(pulled, Ordering::AcqRel);
    }

    pub(crate) fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Acquire)
    }

    pub(crate) fn flushed(&self) -> usize {
        self.flushed.load(Ordering::Acquire)
    }

    pub(crate) fn snapshot(&self) -> BatcherStats {
        BatcherStats {
            accepted: self.accepted.load(Ordering::Acquire),
            rejected: self.rejected.load(Ordering::Acquire),
            flushed: self.flushed.load(Ordering::Acquire),
            flushes: self.flushes.load(Ordering::Acquire),
            failed_flushes: self.failed_flushes.load(Ordering::Acquire),
        }
    }
}
