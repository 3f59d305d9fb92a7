pub mod daemon;
pub mod diff;
pub mod extract;
pub mod init;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use internsync_core::{config, Config, SheetBackendKind};
use internsync_sync::{
    pipeline::{self, Collaborators, RunOptions},
    FileFingerprintStore, RunOutcome,
};

/// Flags that override `config.yaml` and the environment for one command.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// README URL or local path to read instead of the configured source.
    #[arg(long, value_name = "URL|PATH")]
    pub source: Option<String>,

    /// Use a local JSON document as the spreadsheet.
    #[arg(long, value_name = "PATH")]
    pub sheet_file: Option<PathBuf>,
}

pub fn home() -> Result<PathBuf> {
    config::home().context("could not determine home directory")
}

/// Defaults, then `config.yaml`, then the environment, then `overrides`.
pub fn resolve_config(home: &Path, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = config::load_at(home)
        .with_context(|| format!("failed to load {}", config::config_path_at(home).display()))?;
    config.apply_env();
    if let Some(source) = overrides.source.clone() {
        config.source = source;
    }
    if let Some(path) = overrides.sheet_file.clone() {
        config.sheet.backend = SheetBackendKind::File;
        config.sheet.path = Some(path);
    }
    config
        .validate()
        .context("invalid configuration; run `internsync init` or pass --source/--sheet-file")?;
    tracing::debug!(
        source = %config.source,
        backend = ?config.sheet.backend,
        "resolved configuration"
    );
    Ok(config)
}

/// Build the real collaborators for `config` and run the pipeline once.
pub fn run_pipeline(
    home: &Path,
    config: &Config,
    dry_run: bool,
    force: bool,
) -> Result<RunOutcome> {
    let source = internsync_io::source_for(&config.source);
    let mut sheet = internsync_io::sheet_backend(config).context("failed to open spreadsheet")?;
    let mut fingerprints = FileFingerprintStore::at(home);

    let opts = RunOptions {
        dry_run,
        force,
        ..RunOptions::from_config(config)
    };
    let outcome = pipeline::run(
        &mut Collaborators {
            source: source.as_ref(),
            sheet: sheet.as_mut(),
            fingerprints: &mut fingerprints,
        },
        &opts,
    )
    .with_context(|| format!("sync failed for '{}'", config.source))?;
    Ok(outcome)
}
