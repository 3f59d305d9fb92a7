//! `internsync init`: write `~/.internsync/config.yaml`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use internsync_core::{config, Config, SheetBackendKind};

use super::home;
use crate::InsertPolicyArg;

/// Arguments for `internsync init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// README URL or local path to track.
    #[arg(long, value_name = "URL|PATH")]
    pub source: Option<String>,

    /// Browser URL of the Google spreadsheet.
    #[arg(long, value_name = "URL", conflicts_with = "sheet_file")]
    pub spreadsheet_link: Option<String>,

    /// Worksheet (tab) title.
    #[arg(long, short = 'w')]
    pub worksheet: Option<String>,

    /// Keep the sheet in a local JSON document instead of Google Sheets.
    #[arg(long, value_name = "PATH")]
    pub sheet_file: Option<PathBuf>,

    /// Where new rows go: top | append.
    #[arg(long, value_name = "POLICY")]
    pub insert_policy: Option<InsertPolicyArg>,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let path = config::config_path_at(&home);
        if path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }

        let mut config = Config::default();
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(link) = self.spreadsheet_link {
            internsync_io::parse_spreadsheet_link(&link)
                .with_context(|| format!("'{link}' is not a spreadsheet link"))?;
            config.sheet.spreadsheet_link = Some(link);
        }
        if let Some(worksheet) = self.worksheet {
            config.sheet.worksheet = worksheet;
        }
        if let Some(sheet_file) = self.sheet_file {
            config.sheet.backend = SheetBackendKind::File;
            config.sheet.path = Some(sheet_file);
        }
        if let Some(policy) = self.insert_policy {
            config.insert_policy = policy.into();
        }

        let path = config::save_at(&home, &config).context("failed to write config")?;
        println!("✓ Wrote {}", path.display());
        if let Err(err) = config.validate() {
            println!("  note: {err}");
        }
        Ok(())
    }
}
