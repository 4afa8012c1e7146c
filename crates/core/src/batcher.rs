use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::{Error, Result};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use log::{debug, error, info, trace};

use crate::{
    config::BatcherConfig,
    pending::{FlushHandler, FlushTally, Pending},
    stats::{BatcherStats, Counters},
};

/// State shared between the handle and the flush worker.
#[derive(Default)]
struct Shared {
    stop: AtomicBool,
    counters: Counters,
}

impl Shared {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Bounded, time-flushed batching buffer.
///
/// Construction starts one background worker that sleeps for the flush
/// interval and then calls the flush handler, forever. The first flush
/// happens one interval after construction.
///
/// Dropping the `Batcher` does not stop the worker early: it keeps flushing
/// until every accepted item has been handed over, then exits on its own.
/// Use [`Batcher::shutdown`] to stop it deterministically.
pub struct Batcher<T> {
    queue: Sender<T>,
    shared: Arc<Shared>,
    capacity: usize,
    flush_interval: Duration,
    poll_interval: Duration,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Batcher<T> {
    /// Start a batcher holding at most `capacity` items and calling `flush`
    /// every `flush_interval`.
    pub fn new<F>(flush: F, capacity: usize, flush_interval: Duration) -> Self
    where
        F: FnMut(Pending<'_, T>) + Send + 'static,
    {
        Self::with_config(flush, BatcherConfig::new(capacity, flush_interval))
    }

    pub fn with_config<F>(flush: F, config: BatcherConfig) -> Self
    where
        F: FnMut(Pending<'_, T>) + Send + 'static,
    {
        Self::from_handler(flush, config)
    }

    /// Start a batcher driven by any [`FlushHandler`] implementation.
    pub fn from_handler<H: FlushHandler<T>>(handler: H, config: BatcherConfig) -> Self {
        let capacity = config.effective_capacity();
        let (tx, rx) = channel::bounded(capacity);
        let shared = Arc::new(Shared::default());

        let worker = Worker {
            queue: rx,
            handler,
            shared: Arc::clone(&shared),
            flush_interval: config.flush_interval,
            isolate_panics: config.isolate_panics,
        };

        // Same failure semantics as `thread::spawn`.
        let worker = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || worker.run())
            .expect("failed to spawn batch flush thread");

        Self {
            queue: tx,
            shared,
            capacity,
            flush_interval: config.flush_interval,
            poll_interval: config.poll_interval,
            worker,
        }
    }

    /// Queue `item` for the next flush without blocking.
    ///
    /// Returns `false` when the queue is full. The item is dropped in that
    /// case and will never be flushed; callers must not treat `false` as
    /// "retry later".
    pub fn add(&self, item: T) -> bool {
        let accepted = match self.queue.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("[batcher] queue full ({}), item dropped", self.capacity);
                false
            }
            // The worker died from a handler panic.
            Err(TrySendError::Disconnected(_)) => false,
        };

        self.shared.counters.record_add(accepted);
        accepted
    }

    /// Block until every item accepted before this call has been handed to
    /// a flush invocation that has returned.
    ///
    /// This polls every `poll_interval`, so it may return up to one poll
    /// later than the moment the queue drained. Call it after producers
    /// have stopped, typically right before the process exits.
    ///
    /// The guarantee needs every earlier `add` to have returned before
    /// `wait` starts, as it does once producer threads are joined. Adds
    /// issued after `wait` starts never delay it. An `add` still in flight
    /// when `wait` starts may be counted out of order, and `wait` then only
    /// promises that as many items as had been counted have been flushed.
    ///
    /// An item pulled by a flush that is still running does not count as
    /// drained yet. If the flush worker has died from a panic (see
    /// [`BatcherConfig::isolate_panics`]) this never returns; use
    /// [`Batcher::wait_timeout`] when that matters.
    pub fn wait(&self) {
        self.wait_for(self.shared.counters.accepted());
    }

    /// Like [`Batcher::wait`] but gives up after `timeout`.
    ///
    /// Returns `true` if the queue drained in time. A timeout too large to
    /// be represented as a deadline waits without limit.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let target = self.shared.counters.accepted();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_for(target);
            return true;
        };

        loop {
            if self.drained(target) {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }

    fn wait_for(&self, target: usize) {
        while !self.drained(target) {
            thread::sleep(self.poll_interval);
        }
    }

    fn drained(&self, target: usize) -> bool {
        self.shared.counters.flushed() >= target
    }

    /// Stop the flush worker and wait for it to exit.
    ///
    /// The worker is woken if it is sleeping, runs one last flush over what
    /// is still queued, and exits. Fails if the worker died from a panic in
    /// the flush handler.
    pub fn shutdown(self) -> Result<()> {
        let Self { queue, shared, worker, .. } = self;

        shared.stop.store(true, Ordering::Release);
        worker.thread().unpark();

        let joined = worker.join();
        drop(queue);

        joined.map_err(|_| Error::msg("batch flush thread panicked"))
    }

    /// Items currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn stats(&self) -> BatcherStats {
        self.shared.counters.snapshot()
    }
}

struct Worker<T, H> {
    queue: Receiver<T>,
    handler: H,
    shared: Arc<Shared>,
    flush_interval: Duration,
    isolate_panics: bool,
}

impl<T, H: FlushHandler<T>> Worker<T, H> {
    fn run(mut self) {
        info!(
            "[batcher] flush worker started (capacity={}, interval={:?})",
            self.queue.capacity().unwrap_or_default(),
            self.flush_interval
        );

        loop {
            if !self.sleep_until_tick() {
                self.flush();
                info!("[batcher] flush worker stopped");
                return;
            }

            if !self.flush() {
                info!("[batcher] all producers gone, flush worker exiting");
                return;
            }
        }
    }

    /// Sleep one flush interval. Returns `false` once a stop was requested.
    fn sleep_until_tick(&self) -> bool {
        if self.flush_interval.is_zero() {
            thread::yield_now();
            return !self.shared.stopped();
        }

        let Some(deadline) = Instant::now().checked_add(self.flush_interval) else {
            // The interval never elapses; only `shutdown` ends the sleep.
            while !self.shared.stopped() {
                thread::park();
            }
            return false;
        };

        loop {
            if self.shared.stopped() {
                return false;
            }

            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            // Woken early by `shutdown`, or spuriously.
            thread::park_timeout(deadline - now);
        }
    }

    /// Run the handler once. Returns `false` when the queue is closed and
    /// empty, meaning no further flush can ever see an item.
    fn flush(&mut self) -> bool {
        let tally = FlushTally::default();
        let pending = Pending::new(&self.queue, &tally);

        let failed = if self.isolate_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| self.handler.flush(pending))) {
                Ok(()) => false,
                Err(payload) => {
                    error!(
                        "[batcher] flush handler panicked after {} items: {}",
                        tally.pulled(),
                        panic_message(payload.as_ref())
                    );
                    true
                }
            }
        } else {
            self.handler.flush(pending);
            false
        };

        let pulled = tally.pulled();
        if pulled > 0 {
            debug!("[batcher] flushed {pulled} items");
        }
        self.shared.counters.record_flush(pulled, failed);

        !tally.disconnected()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
#[path = "batcher_tests.rs"]
mod tests;
