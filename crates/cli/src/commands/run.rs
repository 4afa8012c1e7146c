use std::{
    process::ExitCode,
    sync::{Arc, Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Error, Result};
use batch_core::{Batcher, BatcherConfig, Pending};
use clap::Args;
use log::{error, info, warn};

use crate::printer::{HumanPrinter, JsonPrinter, OutputFormat, ReportPrinter, RunReport};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Queue capacity (default: $BATCH_CAPACITY or 1024)
    #[arg(long, short = 'c')]
    pub capacity: Option<usize>,

    /// Flush interval in milliseconds (default: $BATCH_FLUSH_INTERVAL_MS or 1000)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Number of concurrent producer threads
    #[arg(long, short = 'p', default_value = "4")]
    pub producers: usize,

    /// Items each producer tries to add
    #[arg(long, short = 'n', default_value = "1000")]
    pub items: usize,

    /// Stop waiting for the queue to drain after this many milliseconds
    #[arg(long)]
    pub wait_timeout_ms: Option<u64>,

    /// Print the report as a single JSON object
    #[arg(long)]
    pub json: bool,
}

/// Payload pushed by the producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Item {
    producer: usize,
    seq: usize,
}

/// What the flush handler observed across all flushes.
#[derive(Debug, Default)]
pub(crate) struct Delivery {
    last_seq: Vec<Option<usize>>,
    delivered: usize,
    batches: usize,
    largest_batch: usize,
    out_of_order: usize,
}

impl Delivery {
    pub(crate) fn new(producers: usize) -> Self {
        Self {
            last_seq: vec![None; producers],
            ..Self::default()
        }
    }

    pub(crate) fn record_batch(&mut self, rows: impl Iterator<Item = Item>) {
        let mut size = 0;

        for item in rows {
            size += 1;

            let last = &mut self.last_seq[item.producer];
            if last.is_some_and(|prev| item.seq <= prev) {
                self.out_of_order += 1;
            }
            *last = Some(item.seq);
        }

        if size > 0 {
            self.delivered += size;
            self.batches += 1;
            self.largest_batch = self.largest_batch.max(size);
        }
    }
}

pub fn run(args: RunArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[run] {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Apply command line overrides on top of an environment-derived config.
pub(crate) fn apply_overrides(mut config: BatcherConfig, args: &RunArgs) -> BatcherConfig {
    if let Some(capacity) = args.capacity {
        config = config.with_capacity(capacity);
    }
    if let Some(ms) = args.interval_ms {
        config = config.with_flush_interval(Duration::from_millis(ms));
    }
    config
}

fn execute(args: RunArgs) -> Result<ExitCode> {
    let env_config = BatcherConfig::from_env().context("invalid batcher environment")?;
    let config = apply_overrides(env_config, &args);

    info!(
        "[run] {} producers x {} items, capacity={}, interval={:?}",
        args.producers, args.items, config.capacity, config.flush_interval
    );

    let delivery = Arc::new(Mutex::new(Delivery::new(args.producers)));
    let batcher = {
        let delivery = Arc::clone(&delivery);
        Batcher::with_config(
            move |rows: Pending<'_, Item>| {
                delivery
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record_batch(rows);
            },
            config,
        )
    };

    let started = Instant::now();
    let accepted = produce(&batcher, args.producers, args.items)?;

    let drained = match args.wait_timeout_ms {
        Some(ms) => batcher.wait_timeout(Duration::from_millis(ms)),
        None => {
            batcher.wait();
            true
        }
    };
    let elapsed = started.elapsed();

    if !drained {
        warn!("[run] queue did not drain within the wait timeout");
    }

    let capacity = batcher.capacity();
    let flush_interval = batcher.flush_interval();
    let stats = batcher.stats();
    batcher.shutdown()?;

    let delivery = delivery.lock().unwrap_or_else(PoisonError::into_inner);
    let report = RunReport {
        capacity,
        flush_interval,
        producers: args.producers,
        attempted: args.producers.saturating_mul(args.items),
        accepted,
        rejected: stats.rejected,
        delivered: delivery.delivered,
        batches: delivery.batches,
        largest_batch: delivery.largest_batch,
        out_of_order: delivery.out_of_order,
        drained,
        elapsed,
    };

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let mut printer: Box<dyn ReportPrinter> = match format {
        OutputFormat::Human => Box::new(HumanPrinter::new(std::io::stdout())),
        OutputFormat::Json => Box::new(JsonPrinter::new(std::io::stdout())),
    };
    printer.print_report(&report)?;

    if report.is_consistent() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Run `producers` threads adding `items` each. Returns how many were accepted.
fn produce(batcher: &Batcher<Item>, producers: usize, items: usize) -> Result<usize> {
    thread::scope(|s| {
        let handles: Vec<_> = (0..producers)
            .map(|producer| {
                s.spawn(move || {
                    (0..items)
                        .filter(|&seq| batcher.add(Item { producer, seq }))
                        .count()
                })
            })
            .collect();

        sum_accepted(handles.into_iter().map(|h| h.join()))
    })
}

/// Add up per-producer counts, failing if any producer panicked.
pub(crate) fn sum_accepted(
    mut counts: impl Iterator<Item = thread::Result<usize>>,
) -> Result<usize> {
    counts.try_fold(0usize, |total, count| {
        let count = count.map_err(|_| Error::msg("producer thread panicked"))?;
        Ok(total.saturating_add(count))
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
