//! internsync: keep an internship spreadsheet in step with a README table.
//!
//! # Usage
//!
//! ```text
//! internsync init [--source <url|path>] [--spreadsheet-link <url>] [--sheet-file <path>]
//! internsync sync [--dry-run] [--force] [--source ...] [--sheet-file ...]
//! internsync diff [--source ...] [--sheet-file ...]
//! internsync extract [--source ...] [--output <file.json>] [--json]
//! internsync status [--json]
//! internsync daemon [--interval <secs>]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    daemon::DaemonArgs, diff::DiffArgs, extract::ExtractArgs, init::InitArgs,
    status::StatusArgs, sync::SyncArgs,
};
use internsync_core::InsertPolicy;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "internsync",
    version,
    about = "Sync an internship README table into a spreadsheet without losing your notes",
    long_about = None,
)]
struct Cli {
    /// Only log warnings and errors (RUST_LOG still wins).
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.internsync/config.yaml.
    Init(InitArgs),

    /// Fetch the README and reconcile it into the spreadsheet.
    Sync(SyncArgs),

    /// Show the row changes the next sync would make.
    Diff(DiffArgs),

    /// Parse the README table and print or back up the postings.
    Extract(ExtractArgs),

    /// Show configuration, recorded fingerprints and the last scheduled run.
    Status(StatusArgs),

    /// Run sync on a fixed interval until Ctrl-C.
    Daemon(DaemonArgs),
}

// ---------------------------------------------------------------------------
// Shared InsertPolicy argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `InsertPolicy` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertPolicyArg(pub InsertPolicy);

impl FromStr for InsertPolicyArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self(InsertPolicy::Top)),
            "append" => Ok(Self(InsertPolicy::Append)),
            other => Err(format!(
                "unknown insert policy '{other}'; expected: top, append"
            )),
        }
    }
}

impl fmt::Display for InsertPolicyArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            InsertPolicy::Top => f.write_str("top"),
            InsertPolicy::Append => f.write_str("append"),
        }
    }
}

impl From<InsertPolicyArg> for InsertPolicy {
    fn from(p: InsertPolicyArg) -> Self {
        p.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Extract(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Daemon(args) => args.run(),
    }
}
