//! # internsync-daemon
//!
//! Periodic runner for the sync pipeline. Each tick reloads the config,
//! runs one sync on a blocking thread and records the result in
//! `~/.internsync/run/last_run.json`. Failed runs are logged and retried on
//! the next tick; the scheduler itself only stops on Ctrl-C.

pub mod error;
pub mod paths;
pub mod runtime;

pub use error::DaemonError;
pub use paths::DEFAULT_INTERVAL;
pub use runtime::{
    init_tracing, read_last_run_at, run, run_until, start_blocking, sync_job, write_last_run_at,
    RunRecord, SyncJob,
};
