use std::process::ExitCode;

use batch_core::BatcherConfig;
use batch_runtime::{CAPACITY_ENV, FLUSH_INTERVAL_ENV, PROGRAM_LOG_LEVEL};
use log::error;

pub fn run() -> ExitCode {
    let config = match BatcherConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[config] {e:#}");
            return ExitCode::from(2);
        }
    };

    println!("capacity:        {}", config.capacity);
    println!("flush interval:  {:?}", config.flush_interval);
    println!("wait poll:       {:?}", config.poll_interval);
    println!("isolate panics:  {}", config.isolate_panics);
    println!("worker thread:   {}", config.thread_name);
    println!();
    println!("overrides: {CAPACITY_ENV}, {FLUSH_INTERVAL_ENV}, {PROGRAM_LOG_LEVEL}");

    ExitCode::SUCCESS
}
