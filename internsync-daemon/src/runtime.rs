use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior};

use internsync_core::config;
use internsync_sync::{
    pipeline::{self, Collaborators, RunOptions},
    FileFingerprintStore, RunOutcome, RunSummary, SyncError,
};

use crate::error::{io_err, DaemonError};
use crate::paths::{last_run_path, run_dir};

/// One scheduled sync: builds its collaborators and runs the pipeline.
pub type SyncJob = dyn Fn() -> Result<RunOutcome, SyncError> + Send + Sync;

/// What the last scheduled run did, persisted to `run/last_run.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// `applied`, `unchanged`, `planned` or `failed`.
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub retryable: bool,
}

impl RunRecord {
    fn from_result(
        started_at: DateTime<Utc>,
        elapsed: Duration,
        result: &Result<RunOutcome, SyncError>,
    ) -> Self {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(outcome) => Self {
                started_at,
                duration_ms,
                outcome: outcome.label().to_string(),
                summary: Some(outcome.summary().clone()),
                error: None,
                retryable: false,
            },
            Err(err) => Self {
                started_at,
                duration_ms,
                outcome: "failed".to_string(),
                summary: None,
                error: Some(err.to_string()),
                retryable: err.is_retryable(),
            },
        }
    }
}

/// Start the scheduler and block the current thread until Ctrl-C.
pub fn start_blocking(home: &Path, every: Duration) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    let job = Arc::new(sync_job(home.to_path_buf()));
    runtime.block_on(run(home.to_path_buf(), every, job))
}

/// Run `job` every `every` until Ctrl-C.
pub async fn run(home: PathBuf, every: Duration, job: Arc<SyncJob>) -> Result<(), DaemonError> {
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received ctrl-c, shutting down scheduler"),
            Err(err) => tracing::error!("ctrl-c handler failed: {err}"),
        }
    };
    run_until(home, every, job, shutdown).await
}

/// Run `job` on a fixed interval until `shutdown` resolves.
///
/// The first run starts immediately. Runs never overlap: a run that takes
/// longer than `every` delays the next tick instead of queueing extra ones.
pub async fn run_until<F>(
    home: PathBuf,
    every: Duration,
    job: Arc<SyncJob>,
    shutdown: F,
) -> Result<(), DaemonError>
where
    F: Future<Output = ()>,
{
    ensure_run_dir(&home)?;
    tracing::info!("scheduler started, syncing every {}s", every.as_secs());

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                let record = run_once(job.clone()).await?;
                let path = last_run_path(&home);
                let record_home = home.clone();
                tokio::task::spawn_blocking(move || write_last_run_at(&record_home, &record))
                    .await
                    .map_err(|err| DaemonError::Task {
                        task: "record",
                        message: err.to_string(),
                    })??;
                tracing::debug!("recorded run at {}", path.display());
            }
        }
    }

    tracing::info!("scheduler stopped");
    Ok(())
}

async fn run_once(job: Arc<SyncJob>) -> Result<RunRecord, DaemonError> {
    let started_at = Utc::now();
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || job())
        .await
        .map_err(|err| DaemonError::Task {
            task: "sync",
            message: err.to_string(),
        })?;

    match &result {
        Ok(outcome) => {
            let summary = outcome.summary();
            tracing::info!(
                outcome = outcome.label(),
                added = summary.added,
                updated = summary.updated,
                unchanged = summary.unchanged,
                "scheduled sync finished",
            );
        }
        Err(err) if err.is_retryable() => {
            tracing::warn!(error = %err, "scheduled sync failed, retrying next tick");
        }
        Err(err) => {
            tracing::error!(error = %err, "scheduled sync failed");
        }
    }
    Ok(RunRecord::from_result(started_at, started.elapsed(), &result))
}

/// The production job: reload config, build real collaborators, run once.
///
/// Config is re-read every tick so edits apply without a restart.
pub fn sync_job(home: PathBuf) -> impl Fn() -> Result<RunOutcome, SyncError> + Send + Sync {
    move || {
        let mut config = config::load_at(&home)?;
        config.apply_env();
        config.validate()?;

        let source = internsync_io::source_for(&config.source);
        let mut sheet = internsync_io::sheet_backend(&config)?;
        let mut fingerprints = FileFingerprintStore::at(&home);
        pipeline::run(
            &mut Collaborators {
                source: source.as_ref(),
                sheet: sheet.as_mut(),
                fingerprints: &mut fingerprints,
            },
            &RunOptions::from_config(&config),
        )
    }
}

// ---------------------------------------------------------------------------
// Last-run record
// ---------------------------------------------------------------------------

pub fn write_last_run_at(home: &Path, record: &RunRecord) -> Result<(), DaemonError> {
    ensure_run_dir(home)?;
    let path = last_run_path(home);
    let json = serde_json::to_string_pretty(record)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// The last recorded run, or `None` if the scheduler never completed one.
pub fn read_last_run_at(home: &Path) -> Result<Option<RunRecord>, DaemonError> {
    let path = last_run_path(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn ensure_run_dir(home: &Path) -> Result<(), DaemonError> {
    let dir = run_dir(home);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
