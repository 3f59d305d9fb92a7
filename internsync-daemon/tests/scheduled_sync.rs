//! A scheduled run against a local README and a file-backed sheet.

use std::sync::Arc;
use std::time::Duration;

use internsync_core::config::{save_at, Config, SheetBackendKind, SheetConfig};
use internsync_daemon::{read_last_run_at, run_until, sync_job};
use internsync_sync::{RunOutcome, SheetBackend};
use internsync_io::JsonFileSheet;
use tempfile::TempDir;

const README: &str = "# Summer 2026 Tech Internships\n\n\
    | Company | Role | Location | Application/Link | Date Posted |\n\
    | --- | --- | --- | :---: | :---: |\n\
    | Acme | SWE Intern | NYC | http://a | Jun 01 |\n\
    | Globex | ML Intern | SF | http://b | Jun 03 |\n";

fn setup() -> (TempDir, std::path::PathBuf) {
    let home = TempDir::new().expect("home");
    let readme = home.path().join("README.md");
    std::fs::write(&readme, README).expect("readme");
    let sheet_path = home.path().join("sheet.json");
    let config = Config {
        source: readme.display().to_string(),
        sheet: SheetConfig {
            backend: SheetBackendKind::File,
            path: Some(sheet_path.clone()),
            ..SheetConfig::default()
        },
        write_delay_ms: 0,
        ..Config::default()
    };
    save_at(home.path(), &config).expect("save config");
    (home, sheet_path)
}

#[test]
fn job_applies_then_skips_unchanged_readme() {
    let (home, sheet_path) = setup();
    let job = sync_job(home.path().to_path_buf());

    match job().expect("first run") {
        RunOutcome::Applied { summary, .. } => {
            assert_eq!(summary.added, 2);
            assert!(summary.full_upload);
        }
        other => panic!("expected applied, got {other:?}"),
    }
    let mut sheet = JsonFileSheet::open(&sheet_path, "Sheet1").expect("open");
    let rows = sheet.read_all().expect("read");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "Acme");

    assert!(matches!(job().expect("second run"), RunOutcome::Unchanged { .. }));
}

#[tokio::test(start_paused = true)]
async fn scheduler_records_each_run() {
    let (home, _) = setup();
    let inner = sync_job(home.path().to_path_buf());
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let tx = std::sync::Mutex::new(Some(tx));
    let runs = std::sync::atomic::AtomicUsize::new(0);
    let job = move || {
        let result = inner();
        if runs.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 1 {
            if let Some(tx) = tx.lock().expect("lock").take() {
                let _ = tx.send(());
            }
        }
        result
    };

    run_until(
        home.path().to_path_buf(),
        Duration::from_secs(60),
        Arc::new(job),
        async {
            let _ = rx.await;
        },
    )
    .await
    .expect("scheduler");

    let record = read_last_run_at(home.path())
        .expect("read")
        .expect("record");
    assert_eq!(record.outcome, "unchanged");
    assert!(record.error.is_none());
    assert_eq!(record.summary.expect("summary").added, 0);
}
