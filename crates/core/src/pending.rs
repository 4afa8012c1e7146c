use std::cell::Cell;

use crossbeam::channel::{Receiver, TryRecvError};

/// Consumer of flushed items.
///
/// Invoked on the worker thread once per flush interval. Whatever the
/// handler does not pull from [`Pending`] stays queued for the next flush.
pub trait FlushHandler<T>: Send + 'static {
    fn flush(&mut self, pending: Pending<'_, T>);
}

impl<T, F> FlushHandler<T> for F
where
    F: FnMut(Pending<'_, T>) + Send + 'static,
{
    fn flush(&mut self, pending: Pending<'_, T>) {
        self(pending)
    }
}

/// What a single flush invocation pulled from the queue.
#[derive(Default)]
pub(crate) struct FlushTally {
    pulled: Cell<usize>,
    disconnected: Cell<bool>,
}

impl FlushTally {
    pub(crate) fn pulled(&self) -> usize {
        self.pulled.get()
    }

    /// Every sender is gone and the queue was observed empty.
    pub(crate) fn disconnected(&self) -> bool {
        self.disconnected.get()
    }
}

/// Live view over the queue handed to a [`FlushHandler`].
///
/// Iterating yields queued items oldest first and stops as soon as the
/// queue is empty. Items added while the handler is still iterating are
/// yielded by the same flush.
pub struct Pending<'a, T> {
    queue: &'a Receiver<T>,
    tally: &'a FlushTally,
}

impl<'a, T> Pending<'a, T> {
    pub(crate) fn new(queue: &'a Receiver<T>, tally: &'a FlushTally) -> Self {
        Self { queue, tally }
    }

    /// Items currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Iterator for Pending<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.queue.try_recv() {
            Ok(item) => {
                self.tally.pulled.set(self.tally.pulled.get() + 1);
                Some(item)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.tally.disconnected.set(true);
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), None)
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
