//! `internsync sync`: reconcile the README into the spreadsheet.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use internsync_sync::{RowsKind, RunOutcome, RunSummary, WriteOp};

use super::{home, resolve_config, run_pipeline, ConfigOverrides};
use crate::InsertPolicyArg;

/// Arguments for `internsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Compute the plan and print the writes without touching the sheet.
    #[arg(long)]
    pub dry_run: bool,

    /// Run even if the README is unchanged since the last sync.
    #[arg(long)]
    pub force: bool,

    /// Where new rows go: top | append.
    #[arg(long, value_name = "POLICY")]
    pub insert_policy: Option<InsertPolicyArg>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let mut config = resolve_config(&home, &self.overrides)?;
        if let Some(policy) = self.insert_policy {
            config.insert_policy = policy.into();
        }

        let outcome = run_pipeline(&home, &config, self.dry_run, self.force)?;
        print_outcome(&outcome);
        Ok(())
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Unchanged { summary } => {
            println!(
                "✓ README unchanged since last sync ({}), nothing to do",
                short(&summary.fingerprint)
            );
        }
        RunOutcome::Planned { summary, ops, .. } => {
            println!(
                "[dry-run] would add {} and update {} rows ({} unchanged) in {} writes",
                summary.added,
                summary.updated,
                summary.unchanged,
                ops.len()
            );
            for op in ops {
                println!("  ~  {}", describe(op));
            }
            print_notes(summary);
        }
        RunOutcome::Applied { summary, report } => {
            let verb = if summary.full_upload { "uploaded" } else { "synced" };
            println!(
                "{} {verb}: {} added, {} updated, {} unchanged",
                "✓".green(),
                report.rows_added,
                report.rows_updated,
                summary.unchanged
            );
            print_notes(summary);
        }
    }
}

fn print_notes(summary: &RunSummary) {
    if summary.duplicates > 0 {
        println!("  ·  {} duplicate postings skipped", summary.duplicates);
    }
    if !summary.orphaned.is_empty() {
        let rows: Vec<String> = summary.orphaned.iter().map(|r| r.to_string()).collect();
        println!(
            "  {}  continuation rows with no company skipped: {}",
            "!".yellow(),
            rows.join(", ")
        );
    }
}

fn describe(op: &WriteOp) -> String {
    match op {
        WriteOp::Clear => "clear sheet".to_string(),
        WriteOp::InsertRows { at, count } => format!("insert {count} blank rows at row {at}"),
        WriteOp::WriteRows { start, rows, kind } => {
            let what = match kind {
                RowsKind::Header => "header",
                RowsKind::Added => "new",
                RowsKind::Updated => "updated",
            };
            let end = start.0 + rows.len().saturating_sub(1);
            format!("write {} {what} rows at {start}..={end}", rows.len())
        }
    }
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
