//! `internsync extract`: parse the README table without touching the sheet.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use internsync_core::{config, Posting};
use internsync_extract::extract;
use internsync_sync::SourceFetcher;

use super::home;

/// Arguments for `internsync extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// README URL or local path (defaults to the configured source).
    #[arg(long, value_name = "URL|PATH")]
    pub source: Option<String>,

    /// Write the postings to this JSON file as a backup.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the postings as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Backup<'a> {
    source: &'a str,
    extracted_at: String,
    postings: &'a [Posting],
}

#[derive(Tabled)]
struct PostingRow {
    #[tabled(rename = "company")]
    company: String,
    #[tabled(rename = "role")]
    role: String,
    #[tabled(rename = "location")]
    location: String,
    #[tabled(rename = "posted")]
    date_posted: String,
}

impl ExtractArgs {
    pub fn run(self) -> Result<()> {
        let source = match self.source {
            Some(source) => source,
            None => {
                let home = home()?;
                let mut config = config::load_at(&home).context("failed to load config")?;
                config.apply_env();
                config.source
            }
        };

        let raw = internsync_io::source_for(&source)
            .fetch(&source)
            .with_context(|| format!("failed to fetch '{source}'"))?;
        let extraction =
            extract(&raw).with_context(|| format!("no postings table in '{source}'"))?;

        if let Some(path) = self.output.as_ref() {
            write_backup(path, &source, &extraction.postings)?;
            eprintln!(
                "wrote {} postings to {}",
                extraction.postings.len(),
                path.display()
            );
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&extraction.postings)
                    .context("failed to serialize postings")?
            );
        } else if self.output.is_none() {
            print_table(&extraction.postings);
        }

        if !extraction.orphaned.is_empty() {
            let rows: Vec<String> = extraction.orphaned.iter().map(|r| r.to_string()).collect();
            eprintln!(
                "{} skipped continuation rows with no company: {}",
                "warning:".yellow(),
                rows.join(", ")
            );
        }
        Ok(())
    }
}

fn write_backup(path: &Path, source: &str, postings: &[Posting]) -> Result<()> {
    let backup = Backup {
        source,
        extracted_at: chrono::Utc::now().to_rfc3339(),
        postings,
    };
    let json = serde_json::to_string_pretty(&backup).context("failed to serialize postings")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}

fn print_table(postings: &[Posting]) {
    println!("{} postings", postings.len());
    if postings.is_empty() {
        return;
    }
    let rows: Vec<PostingRow> = postings
        .iter()
        .map(|p| PostingRow {
            company: p.company.clone(),
            role: p.role.clone(),
            location: p.location.clone(),
            date_posted: p.date_posted.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
