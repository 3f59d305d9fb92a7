use std::path::{Path, PathBuf};
use std::time::Duration;

use internsync_core::config::state_dir_at;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const LAST_RUN_FILE: &str = "last_run.json";

pub fn run_dir(home: &Path) -> PathBuf {
    state_dir_at(home).join("run")
}

pub fn last_run_path(home: &Path) -> PathBuf {
    run_dir(home).join(LAST_RUN_FILE)
}
