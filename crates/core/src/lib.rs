//! Time-triggered, bounded batching buffer.
//!
//! Producers hand items to a [`Batcher`] with [`Batcher::add`], which never
//! blocks: an item is either queued or dropped on the spot when the queue is
//! full. A single background worker wakes up every flush interval and hands
//! the queued items, oldest first, to a caller supplied flush handler.
//!
//! ```no_run
//! use std::time::Duration;
//! use batch_core::{Batcher, Pending};
//!
//! let batcher = Batcher::new(
//!     |rows: Pending<'_, String>| {
//!         for row in rows {
//!             println!("{row}");
//!         }
//!     },
//!     1_000,
//!     Duration::from_secs(1),
//! );
//!
//! batcher.add("row 1".to_string());
//! batcher.add("row 2".to_string());
//! batcher.wait();
//! ```

mod batcher;
mod config;
mod pending;
mod stats;

pub use batcher::Batcher;
pub use config::BatcherConfig;
pub use pending::{FlushHandler, Pending};
pub use stats::BatcherStats;
