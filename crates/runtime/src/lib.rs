mod config;
pub mod logging;

pub use config::{
    CAPACITY_ENV, DEFAULT_CAPACITY, DEFAULT_FLUSH_INTERVAL, FLUSH_INTERVAL_ENV, PROGRAM_LOG_LEVEL,
    PROGRAM_NAME, WAIT_POLL_INTERVAL, WORKER_THREAD_NAME, capacity_from_env,
    flush_interval_from_env,
};

pub use logging::init;
