//! `internsync daemon`: run sync on a fixed interval in the foreground.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use internsync_daemon::{start_blocking, DEFAULT_INTERVAL};

use super::home;

/// Arguments for `internsync daemon`.
#[derive(Args, Debug)]
pub struct DaemonArgs {
    /// Seconds between sync runs.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_INTERVAL.as_secs())]
    pub interval: u64,
}

impl DaemonArgs {
    pub fn run(self) -> Result<()> {
        if self.interval == 0 {
            bail!("--interval must be at least 1 second");
        }
        let home = home()?;
        println!(
            "syncing every {}s, last run recorded in {} (Ctrl-C to stop)",
            self.interval,
            internsync_daemon::paths::last_run_path(&home).display()
        );
        start_blocking(&home, Duration::from_secs(self.interval))
            .context("daemon exited with error")?;
        Ok(())
    }
}
