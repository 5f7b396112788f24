/// Process-level tests for the daily-allocation binary
///
/// Every run here reads grids from test-fixtures/ and uses --dry-run or
/// --preview, so nothing touches the network or an SMTP server.
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const CONFIG_KEYS: [&str; 14] = [
    "SHEET_URL",
    "SERVICE_ACCOUNT_FILE",
    "EMAIL_USERNAME",
    "EMAIL_PASSWORD",
    "RECIPIENTS",
    "CC_RECIPIENT",
    "SMTP_SERVER",
    "SMTP_PORT",
    "SENDER_NAME",
    "EMAIL_DOMAIN",
    "PROJECT_NAMES",
    "SCHEDULE_TIME",
    "SKIP_EMPTY_REPORTS",
    "LOCK_FILE",
];

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures")
}

/// Binary with configuration variables cleared and the home/config dirs isolated
fn command(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_daily-allocation"));
    for key in CONFIG_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join("config")).env("XDG_CACHE_HOME", home.join("cache"));
    cmd
}

/// Dry run against the fixture grids and config, with the lock file in `home`
fn dry_run(home: &Path, args: &[&str]) -> Output {
    let fixtures = fixtures_dir();
    command(home)
        .arg("--config")
        .arg(fixtures.join("config.toml"))
        .arg("--grid-dir")
        .arg(fixtures.join("grids"))
        .arg("--dry-run")
        .args(args)
        .env("LOCK_FILE", home.join("run.lock"))
        .output()
        .expect("Failed to run daily-allocation")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output, context: &str) {
    assert!(
        output.status.success(),
        "{} failed with status: {:?}\nstdout: {}\nstderr: {}",
        context,
        output.status.code(),
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_preview_prints_both_renderings() {
    let home = tempfile::tempdir().unwrap();
    let output =
        command(home.path()).arg("--preview").arg(fixtures_dir().join("grids/2024-03-15.json")).output().unwrap();
    assert_success(&output, "preview");

    let out = stdout(&output);
    assert!(out.contains("=== Plain text ==="));
    assert!(out.contains("ISB:\n"));
    assert!(out.contains("- Login page (WIP)"));
    assert!(out.contains("- API tests & fixtures (WIP)"));
    assert!(out.contains("Operations:\n- Invoice run (Done)"));
    assert!(out.contains("<table class=\"summary\">"));
    assert!(out.contains("<h3>ISB</h3>"));
    assert!(out.contains("API tests &amp; fixtures"));
}

#[test]
fn test_preview_json() {
    let home = tempfile::tempdir().unwrap();
    let output = command(home.path())
        .arg("--preview")
        .arg(fixtures_dir().join("preview.json"))
        .args(["--json", "--date", "2024-03-15"])
        .output()
        .unwrap();
    assert_success(&output, "preview --json");

    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("stdout should be JSON");
    assert_eq!(doc["date"], "2024-03-15");
    assert_eq!(doc["plain"], "\nISB:\n- Login page (WIP)");
    // Numbers and nulls in the file come through as cell text
    assert_eq!(doc["projects"]["ISB"][0][9], "3");
    assert_eq!(doc["projects"]["ISB"][0][10], "");
}

#[test]
fn test_preview_missing_file_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = command(home.path()).args(["--preview", "/nonexistent/grid.json"]).output().unwrap();
    assert!(!output.status.success());
    assert!(stdout(&output).contains("--preview"));
}

#[test]
fn test_dry_run_reply_uses_todays_grid() {
    let home = tempfile::tempdir().unwrap();
    let output = dry_run(home.path(), &["--date", "2024-03-15", "--variant", "reply"]);
    assert_success(&output, "dry-run reply");

    let out = stdout(&output);
    assert!(out.contains("From: Falak <falak@example.com>"));
    assert!(out.contains("To: team@example.com, ops@example.com"));
    assert!(out.contains("Cc: lead@example.com"));
    assert!(out.contains("Subject: Re: Daily Task Allocation - 15 March 2024"));
    assert!(out.contains("In-Reply-To: <daily-allocation-20240315@example.com>"));
    assert!(out.contains("Please find below the updated Daily Allocation for 15 March 2024:"));
    assert!(out.contains("- Login page (WIP)"));
    assert!(!out.contains("Password reset flow"));
    assert!(!out.contains("Subject: Daily Task Allocation"));
}

#[test]
fn test_dry_run_both_on_friday_targets_monday() {
    let home = tempfile::tempdir().unwrap();
    let output = dry_run(home.path(), &["--date", "2024-03-15"]);
    assert_success(&output, "dry-run both");

    let out = stdout(&output);
    let reply = out.find("Subject: Re: Daily Task Allocation - 15 March 2024").expect("reply email");
    let new = out.find("Subject: Daily Task Allocation - 18 March 2024").expect("new email");
    assert!(reply < new, "reply must be sent before new");

    assert!(out.contains("Message-ID: <daily-allocation-20240318@example.com>"));
    assert!(out.contains("Please find below the Daily Allocation for 18 March 2024:"));
    assert!(out.contains("- Password reset flow (Open)"));
    // Seven-cell row under Adhoc is HTML-only
    assert!(!out.contains("Vendor call"));
}

#[test]
fn test_explicit_thread_id() {
    let home = tempfile::tempdir().unwrap();
    let output =
        dry_run(home.path(), &["--date", "2024-03-15", "--variant", "reply", "--in-reply-to", "abc123@mail.example.com"]);
    assert_success(&output, "dry-run reply with thread id");
    assert!(stdout(&output).contains("In-Reply-To: <abc123@mail.example.com>"));
}

#[test]
fn test_weekend_sends_nothing() {
    let home = tempfile::tempdir().unwrap();
    let output = dry_run(home.path(), &["--date", "2024-03-16"]);
    assert_success(&output, "weekend run");

    let out = stdout(&output);
    assert!(out.contains("weekend"));
    assert!(!out.contains("Subject:"));
}

#[test]
fn test_missing_grid_sends_placeholder() {
    let home = tempfile::tempdir().unwrap();
    let output = dry_run(home.path(), &["--date", "2024-03-14", "--variant", "reply"]);
    assert_success(&output, "reply without grid");
    assert!(stdout(&output).contains("No tasks available"));
}

#[test]
fn test_missing_grid_skipped_when_configured() {
    let home = tempfile::tempdir().unwrap();
    let fixtures = fixtures_dir();
    let output = command(home.path())
        .arg("--config")
        .arg(fixtures.join("config.toml"))
        .arg("--grid-dir")
        .arg(fixtures.join("grids"))
        .args(["--dry-run", "--date", "2024-03-19"])
        .env("LOCK_FILE", home.path().join("run.lock"))
        .env("SKIP_EMPTY_REPORTS", "true")
        .output()
        .unwrap();
    assert_success(&output, "skip empty");

    let out = stdout(&output);
    assert!(!out.contains("Subject:"));
    assert!(out.contains("skipped reply email"));
    assert!(out.contains("skipped new email"));
}

#[test]
fn test_missing_configuration_lists_every_key() {
    let home = tempfile::tempdir().unwrap();
    let output = command(home.path())
        .arg("--grid-dir")
        .arg(fixtures_dir().join("grids"))
        .args(["--dry-run", "--date", "2024-03-15"])
        .env("EMAIL_USERNAME", "falak@example.com")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.contains("missing required configuration"));
    assert!(out.contains("SHEET_URL"));
    assert!(out.contains("SERVICE_ACCOUNT_FILE"));
    assert!(out.contains("EMAIL_PASSWORD"));
    assert!(out.contains("RECIPIENTS"));
    assert!(!out.contains("EMAIL_USERNAME"));
    assert!(!out.contains("Subject:"));
}

#[test]
fn test_invalid_flag_combination_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = command(home.path()).arg("--json").output().unwrap();
    assert!(!output.status.success());
    assert!(stdout(&output).contains("--json requires --preview"));
}
