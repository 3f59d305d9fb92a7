//! End-to-end runs of the `internsync` binary against a local README and a
//! file-backed sheet, with `HOME` pointed at a temporary directory.

use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "INTERNSYNC_SOURCE",
    "GOOGLE_SPREADSHEET_LINK",
    "INTERNSYNC_WORKSHEET",
    "GOOGLE_ACCESS_TOKEN",
    "RUST_LOG",
];

fn readme(rows: &[&str]) -> String {
    let mut doc = String::from(
        "# Summer 2026 Tech Internships\n\n\
         | Company | Role | Location | Application/Link | Date Posted |\n\
         | --- | --- | --- | :---: | :---: |\n",
    );
    for row in rows {
        doc.push_str(row);
        doc.push('\n');
    }
    doc
}

fn two_postings() -> String {
    readme(&[
        "| Acme | SWE Intern | NYC | <a href=\"https://acme.example/apply\">Apply</a> | Jun 01 |",
        "| ↳ | ML Intern | SF<br>Remote | https://acme.example/ml | Jun 01 |",
    ])
}

struct Env {
    home: TempDir,
    readme: PathBuf,
    sheet: PathBuf,
}

impl Env {
    fn new(contents: &str) -> Self {
        let home = TempDir::new().expect("home");
        let readme = home.path().join("README.md");
        std::fs::write(&readme, contents).expect("write readme");
        let sheet = home.path().join("sheet.json");
        Self {
            home,
            readme,
            sheet,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("internsync"));
        cmd.current_dir(self.home.path())
            .env("HOME", self.home.path())
            .env("USERPROFILE", self.home.path())
            .env("NO_COLOR", "1");
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    fn init(&self) {
        self.cmd()
            .arg("init")
            .arg("--source")
            .arg(&self.readme)
            .arg("--sheet-file")
            .arg(&self.sheet)
            .assert()
            .success()
            .stdout(contains("config.yaml"));
    }

    fn sheet_rows(&self) -> Vec<Vec<String>> {
        let json = std::fs::read_to_string(&self.sheet).expect("read sheet");
        let doc: serde_json::Value = serde_json::from_str(&json).expect("sheet json");
        serde_json::from_value(doc["rows"].clone()).expect("rows")
    }

    fn write_sheet_rows(&self, rows: &[Vec<String>]) {
        let doc = serde_json::json!({ "worksheet": "Sheet1", "rows": rows });
        std::fs::write(&self.sheet, doc.to_string()).expect("write sheet");
    }
}

#[test]
fn first_sync_uploads_and_second_is_skipped() {
    let env = Env::new(&two_postings());
    env.init();

    env.cmd()
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("uploaded: 2 added, 0 updated"));

    let rows = env.sheet_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "Company");
    assert_eq!(rows[0][3], "Application/Link");
    assert_eq!(rows[1][3], "https://acme.example/apply");
    assert_eq!(rows[2][0], "Acme");
    assert_eq!(rows[2][2], "SF, Remote");

    env.cmd()
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("unchanged since last sync"));
}

#[test]
fn dry_run_touches_nothing() {
    let env = Env::new(&two_postings());

    env.cmd()
        .arg("sync")
        .arg("--dry-run")
        .arg("--source")
        .arg(&env.readme)
        .arg("--sheet-file")
        .arg(&env.sheet)
        .assert()
        .success()
        .stdout(contains("[dry-run] would add 2 and update 0 rows"))
        .stdout(contains("clear sheet"));

    assert!(!env.sheet.exists(), "dry run must not create the sheet");
    assert!(
        !env.home.path().join(".internsync").join("fingerprints.json").exists(),
        "dry run must not record a fingerprint"
    );
}

#[test]
fn sync_keeps_annotations_and_refreshes_redated_rows() {
    let env = Env::new(&two_postings());
    env.init();
    env.cmd().arg("sync").assert().success();

    let mut rows = env.sheet_rows();
    rows[1][5] = "Jane".to_string();
    rows[1][6] = "referred".to_string();
    env.write_sheet_rows(&rows);

    std::fs::write(
        &env.readme,
        readme(&[
            "| Initech | Data Intern | Austin | https://initech.example | Jun 05 |",
            "| Acme | SWE Intern | NYC | <a href=\"https://acme.example/apply\">Apply</a> | Jun 07 |",
            "| ↳ | ML Intern | SF<br>Remote | https://acme.example/ml | Jun 01 |",
        ]),
    )
    .expect("rewrite readme");

    env.cmd()
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("+Company: Initech"))
        .stdout(contains("-Date Posted: Jun 01"))
        .stdout(contains("+Date Posted: Jun 07"))
        .stdout(contains(" Recruiters: Jane"));

    env.cmd()
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("synced: 1 added, 1 updated, 1 unchanged"));

    let rows = env.sheet_rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][0], "Initech");
    assert_eq!(rows[2][0], "Acme");
    assert_eq!(rows[2][4], "Jun 07");
    assert_eq!(rows[2][5], "Jane");
    assert_eq!(rows[2][6], "referred");
}

#[test]
fn diff_on_synced_sheet_reports_nothing() {
    let env = Env::new(&two_postings());
    env.init();
    env.cmd().arg("sync").assert().success();

    env.cmd()
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("No differences."));
}

#[test]
fn missing_table_fails_without_recording_fingerprint() {
    let env = Env::new("# Nothing to see here\n");
    env.init();

    env.cmd()
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("table not found").or(contains("parse error")));
    assert!(!env
        .home
        .path()
        .join(".internsync")
        .join("fingerprints.json")
        .exists());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let env = Env::new(&two_postings());
    env.init();

    env.cmd()
        .args(["init", "--sheet-file", "other.json"])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    env.cmd()
        .args(["init", "--force", "--insert-policy", "append", "--sheet-file", "other.json"])
        .assert()
        .success();
    let yaml = std::fs::read_to_string(env.home.path().join(".internsync").join("config.yaml"))
        .expect("config");
    assert!(yaml.contains("insert_policy: append"), "{yaml}");
}

#[test]
fn unknown_insert_policy_is_a_usage_error() {
    let env = Env::new(&two_postings());
    env.cmd()
        .args(["sync", "--insert-policy", "middle"])
        .assert()
        .failure()
        .stderr(contains("expected: top, append"));
}

#[test]
fn extract_writes_json_backup() {
    let env = Env::new(&two_postings());
    let out = assert_fs::TempDir::new().expect("out dir");
    let backup = out.child("backup").child("postings.json");

    env.cmd()
        .arg("extract")
        .arg("--source")
        .arg(&env.readme)
        .arg("--output")
        .arg(backup.path())
        .assert()
        .success()
        .stderr(contains("wrote 2 postings"));

    backup.assert(predicate::path::exists());
    backup.assert(predicate::str::contains("\"Company\": \"Acme\""));
    backup.assert(predicate::str::contains("\"Role\": \"ML Intern\""));
    out.child("backup")
        .child("postings.json.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn extract_json_lists_postings_in_readme_order() {
    let env = Env::new(&two_postings());
    let output = env
        .cmd()
        .args(["extract", "--json", "--source"])
        .arg(&env.readme)
        .output()
        .expect("run extract");
    assert!(output.status.success());

    let postings: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let postings = postings.as_array().expect("array");
    assert_eq!(postings.len(), 2);
    assert_eq!(postings[0]["Role"], "SWE Intern");
    assert_eq!(postings[1]["Company"], "Acme");
    assert_eq!(postings[1]["Recruiters"], "");
}

#[test]
fn status_reports_recorded_fingerprint() {
    let env = Env::new(&two_postings());
    env.init();

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Never synced"));

    env.cmd().arg("sync").assert().success();

    let output = env
        .cmd()
        .args(["status", "--json"])
        .output()
        .expect("run status");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["config_exists"], true);
    assert_eq!(report["insert_policy"], "top");
    let sources = report["sources"].as_array().expect("sources");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["added"], 2);
    assert_eq!(sources[0]["fingerprint"].as_str().map(str::len), Some(64));
    assert!(report["last_run"].is_null());
}
