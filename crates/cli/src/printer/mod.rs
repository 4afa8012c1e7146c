use std::{
    io::{self, Write},
    time::Duration,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Human,
    /// One JSON object for machine consumption.
    Json,
}

/// Outcome of one `batch run`.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub capacity: usize,
    pub flush_interval: Duration,
    pub producers: usize,
    /// Total `add` calls issued.
    pub attempted: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Items the flush handler received.
    pub delivered: usize,
    /// Non-empty flushes.
    pub batches: usize,
    pub largest_batch: usize,
    /// Items seen before an earlier item of the same producer.
    pub out_of_order: usize,
    /// Whether the drain wait finished before its timeout.
    pub drained: bool,
    pub elapsed: Duration,
}

impl RunReport {
    /// Every accepted item was delivered once, in order.
    pub fn is_consistent(&self) -> bool {
        self.drained && self.out_of_order == 0 && self.delivered == self.accepted
    }
}

pub trait ReportPrinter {
    fn print_report(&mut self, report: &RunReport) -> io::Result<()>;
}

pub struct HumanPrinter<W: Write> {
    out: W,
}

impl<W: Write> HumanPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportPrinter for HumanPrinter<W> {
    fn print_report(&mut self, r: &RunReport) -> io::Result<()> {
        writeln!(
            self.out,
            "[run] capacity {} / interval {:?} / {} producers",
            r.capacity, r.flush_interval, r.producers
        )?;
        writeln!(self.out, "[run] attempted: {}", r.attempted)?;
        writeln!(self.out, "[run] accepted:  {}", r.accepted)?;
        writeln!(self.out, "[run] dropped:   {}", r.rejected)?;
        writeln!(
            self.out,
            "[run] delivered: {} in {} flushes (largest {})",
            r.delivered, r.batches, r.largest_batch
        )?;

        if r.out_of_order > 0 {
            writeln!(self.out, "[run] out of order: {}", r.out_of_order)?;
        }
        if !r.drained {
            writeln!(self.out, "[run] queue did not drain before the timeout")?;
        }

        writeln!(
            self.out,
            "[run] finished in {:.2}ms",
            r.elapsed.as_secs_f64() * 1000.0
        )
    }
}

pub struct JsonPrinter<W: Write> {
    out: W,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportPrinter for JsonPrinter<W> {
    fn print_report(&mut self, r: &RunReport) -> io::Result<()> {
        let obj = serde_json::json!({
            "capacity": r.capacity,
            "flush_interval_ms": r.flush_interval.as_secs_f64() * 1000.0,
            "producers": r.producers,
            "attempted": r.attempted,
            "accepted": r.accepted,
            "rejected": r.rejected,
            "delivered": r.delivered,
            "batches": r.batches,
            "largest_batch": r.largest_batch,
            "out_of_order": r.out_of_order,
            "drained": r.drained,
            "consistent": r.is_consistent(),
            "elapsed_ms": r.elapsed.as_secs_f64() * 1000.0,
        });
        writeln!(self.out, "{}", obj)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
