//! `internsync status`: configuration, recorded fingerprints and last run.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use internsync_core::{config, Config, InsertPolicy, SheetBackendKind};
use internsync_daemon::{read_last_run_at, RunRecord};
use internsync_sync::fingerprint::{self as fingerprint_store, FingerprintEntry};

/// Arguments for `internsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;
        let report = build_report(&home)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_report(&report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    config_path: String,
    config_exists: bool,
    source: String,
    sheet: String,
    insert_policy: &'static str,
    sources: Vec<SourceStatus>,
    last_run: Option<RunRecord>,
}

#[derive(Debug, Serialize)]
struct SourceStatus {
    source: String,
    fingerprint: String,
    recorded_at: DateTime<Utc>,
    added: usize,
    updated: usize,
}

#[derive(Tabled)]
struct SourceTableRow {
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "fingerprint")]
    fingerprint: String,
    #[tabled(rename = "last sync")]
    last_sync: String,
    #[tabled(rename = "added")]
    added: usize,
    #[tabled(rename = "updated")]
    updated: usize,
}

fn build_report(home: &Path) -> Result<StatusReport> {
    let config_path = config::config_path_at(home);
    let mut config = config::load_at(home)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    config.apply_env();

    let store = fingerprint_store::load_at(home).context("failed to load fingerprint store")?;
    let sources = store
        .sources
        .into_iter()
        .map(|(source, entry)| source_status(source, entry))
        .collect();
    let last_run = read_last_run_at(home).context("failed to read last run record")?;

    Ok(StatusReport {
        config_exists: config_path.exists(),
        config_path: config_path.display().to_string(),
        source: config.source.clone(),
        sheet: describe_sheet(&config),
        insert_policy: match config.insert_policy {
            InsertPolicy::Top => "top",
            InsertPolicy::Append => "append",
        },
        sources,
        last_run,
    })
}

fn source_status(source: String, entry: FingerprintEntry) -> SourceStatus {
    SourceStatus {
        source,
        fingerprint: entry.fingerprint,
        recorded_at: entry.recorded_at,
        added: entry.added,
        updated: entry.updated,
    }
}

fn describe_sheet(config: &Config) -> String {
    match config.sheet.backend {
        SheetBackendKind::Google => match config.sheet.spreadsheet_link.as_deref() {
            Some(link) => format!("google: {link} [{}]", config.sheet.worksheet),
            None => "google: (no spreadsheet link)".to_string(),
        },
        SheetBackendKind::File => match config.sheet.path.as_ref() {
            Some(path) => format!("file: {}", path.display()),
            None => "file: (no path)".to_string(),
        },
    }
}

fn print_report(report: &StatusReport) {
    println!("internsync v{}", env!("CARGO_PKG_VERSION"));
    let separator = "■".repeat(60).bright_black().to_string();
    println!("{separator}");

    let config_note = if report.config_exists {
        String::new()
    } else {
        format!(" {}", "(not found, using defaults)".yellow())
    };
    println!("config   {}{config_note}", report.config_path);
    println!("source   {}", report.source);
    println!("sheet    {}", report.sheet);
    println!("inserts  {}", report.insert_policy);
    println!("{separator}");

    if report.sources.is_empty() {
        println!("Never synced. Run 'internsync sync' to upload the README.");
    } else {
        let rows: Vec<SourceTableRow> = report
            .sources
            .iter()
            .map(|s| SourceTableRow {
                source: s.source.clone(),
                fingerprint: s.fingerprint.get(..12).unwrap_or(&s.fingerprint).to_string(),
                last_sync: format_age(s.recorded_at, Utc::now()),
                added: s.added,
                updated: s.updated,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if let Some(run) = report.last_run.as_ref() {
        println!("{separator}");
        let outcome = match run.outcome.as_str() {
            "failed" => run.outcome.red().bold(),
            "applied" => run.outcome.green().bold(),
            _ => run.outcome.normal(),
        };
        println!(
            "last scheduled run: {outcome} {} ({} ms)",
            format_age(run.started_at, Utc::now()),
            run.duration_ms
        );
        if let Some(error) = run.error.as_deref() {
            let hint = if run.retryable {
                "will retry"
            } else {
                "needs attention"
            };
            println!("  {error} ({hint})");
        }
    }
}

/// `"just now"`, `"5m ago"`, `"3h ago"`, `"2d ago"`.
fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ages_are_coarse() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_age(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_age(now + Duration::minutes(1), now), "just now");
    }

    #[test]
    fn sheet_description_names_backend() {
        let mut config = Config::default();
        assert_eq!(describe_sheet(&config), "google: (no spreadsheet link)");
        config.sheet.backend = SheetBackendKind::File;
        config.sheet.path = Some("/tmp/sheet.json".into());
        assert_eq!(describe_sheet(&config), "file: /tmp/sheet.json");
    }
}
