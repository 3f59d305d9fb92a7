//! `internsync diff`: show the row changes the next sync would make.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use internsync_core::Field;
use internsync_sync::{preview, RowChange, RunOutcome};

use super::{home, resolve_config, run_pipeline, ConfigOverrides};

/// Arguments for `internsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let config = resolve_config(&home, &self.overrides)?;

        // Always plan, even when the fingerprint says the README is unchanged:
        // the sheet may have been edited since.
        let outcome = run_pipeline(&home, &config, true, true)?;
        let RunOutcome::Planned { plan, .. } = outcome else {
            return Ok(());
        };

        let changes = preview(&plan, config.insert_policy);
        if changes.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for change in changes {
            match change {
                RowChange::Added { row, posting } => {
                    println!("{}", format!("+++ row {row} (new)").green());
                    for field in Field::ALL {
                        println!("{}", format!("+{field}: {}", posting.get(field)).green());
                    }
                }
                RowChange::Updated { unified_diff, .. } => {
                    print!("{unified_diff}");
                    if !unified_diff.ends_with('\n') {
                        println!();
                    }
                }
            }
        }
        Ok(())
    }
}
