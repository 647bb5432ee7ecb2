//! CLI command integration tests.
//! Each test uses a temp directory via RC_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CURATOR: &str = "0x00000000000000000000000000000000000000c0";
const ORACLE: &str = "0x000000000000000000000000000000000000000a";
const KEEPER: &str = "0x000000000000000000000000000000000000004e";
const ANYONE: &str = "0x0000000000000000000000000000000000000077";

fn rc_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("rcalc").unwrap();
    cmd.env("RC_DATA_DIR", data_dir.path());
    cmd
}

fn init(dir: &TempDir) {
    rc_cmd(dir)
        .args([
            "init",
            "--curator",
            CURATOR,
            "--oracle",
            ORACLE,
            "--keeper",
            KEEPER,
            "--timestamp",
            "1700000000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("phase 8"));
}

fn extract_stat_value<'a>(output: &'a str, label: &str) -> &'a str {
    output
        .lines()
        .find(|l| l.starts_with(label))
        .map(|l| l[label.len()..].trim())
        .unwrap_or("")
}

#[test]
fn eval_needs_no_data_dir() {
    let dir = TempDir::new().unwrap();
    rc_cmd(&dir)
        .args(["eval", "digital_root", "369"])
        .assert()
        .success()
        .stdout("9\n");
    rc_cmd(&dir)
        .args(["eval", "gcd", "0x0c", "18"])
        .assert()
        .success()
        .stdout("6\n");
    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn eval_unknown_function_fails() {
    let dir = TempDir::new().unwrap();
    rc_cmd(&dir)
        .args(["eval", "no_such_fn", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown function"));
}

#[test]
fn eval_rejects_bad_number() {
    let dir = TempDir::new().unwrap();
    rc_cmd(&dir)
        .args(["eval", "digital_root", "12abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid number"));
}

#[test]
fn list_shows_catalogue() {
    let dir = TempDir::new().unwrap();
    rc_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("pow_mod"))
        .stdout(predicate::str::contains("median"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    rc_cmd(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rcalc init"));
}

#[test]
fn init_twice_fails() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["init", "--curator", CURATOR, "--oracle", ORACLE, "--keeper", KEEPER])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_zero_identity() {
    let dir = TempDir::new().unwrap();
    rc_cmd(&dir)
        .args([
            "init",
            "--curator",
            "0x0000000000000000000000000000000000000000",
            "--oracle",
            ORACLE,
            "--keeper",
            KEEPER,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zero address"));
}

#[test]
fn status_fresh_engine() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let output = rc_cmd(&dir).arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(extract_stat_value(&stdout, "keeper:"), KEEPER);
    assert_eq!(extract_stat_value(&stdout, "current_phase:"), "8");
    assert_eq!(extract_stat_value(&stdout, "harmonic_slots:"), "0");
    assert_eq!(extract_stat_value(&stdout, "events:"), "0");
}

#[test]
fn role_gated_command_needs_identity() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["store-harmonic", "5", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("caller is not the keeper"));

    rc_cmd(&dir)
        .args(["--as", KEEPER, "store-harmonic", "5", "42"])
        .assert()
        .success();
    rc_cmd(&dir)
        .args(["get-harmonic", "5"])
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn failed_call_persists_nothing() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["--as", ANYONE, "resolve-triad", "1", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid triad"));

    let output = rc_cmd(&dir).arg("status").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(extract_stat_value(&stdout, "events:"), "0");
}

#[test]
fn resolve_triad_and_events() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["--as", ANYONE, "resolve-triad", "3", "6", "9"])
        .assert()
        .success()
        .stdout("sum=18 root=9\n");
    rc_cmd(&dir)
        .args(["--as", ANYONE, "verify-triad", "1", "1", "2"])
        .assert()
        .success()
        .stdout("false\n");

    let output = rc_cmd(&dir).args(["events", "--limit", "5"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["sequence"], 0);
    assert_eq!(first["event"]["kind"], "TriadResolved");
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["block_number"], 2);
    assert_eq!(second["event"]["valid"], false);
}

#[test]
fn oracle_roundtrip() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["--as", ORACLE, "oracle", "7", "0x31"])
        .assert()
        .success();
    rc_cmd(&dir)
        .args(["oracle-result", "7"])
        .assert()
        .success()
        .stdout("49\n");
    rc_cmd(&dir)
        .args(["oracle-result", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("magnitude must be non-zero"));
}

#[test]
fn send_value_is_forwarded() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["--as", ANYONE, "send-value", "250"])
        .assert()
        .success()
        .stdout("forwarded 250\n");
    rc_cmd(&dir)
        .args(["--as", ANYONE, "super-calc", "3", "6", "9", "--value", "50"])
        .assert()
        .success()
        .stdout("59778\n");

    let output = rc_cmd(&dir).arg("status").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(extract_stat_value(&stdout, "forwarded_total:"), "300");
}

#[test]
fn export_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    rc_cmd(&dir)
        .args(["--as", KEEPER, "record-point", "369"])
        .assert()
        .success()
        .stdout("slot 0 = 369\n");
    rc_cmd(&dir)
        .args(["--as", CURATOR, "set-bound", "1000"])
        .assert()
        .success();

    let export_path = dir.path().join("export.json");
    rc_cmd(&dir)
        .arg("export")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));
    assert!(export_path.exists(), "export file should exist");

    let other = TempDir::new().unwrap();
    rc_cmd(&other)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("events=2"));

    let output = rc_cmd(&other).arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(extract_stat_value(&stdout, "magnitude_bound:"), "1000");
    assert_eq!(extract_stat_value(&stdout, "curator:"), CURATOR);
    rc_cmd(&other)
        .args(["get-harmonic", "0"])
        .assert()
        .success()
        .stdout("369\n");
}

#[test]
fn import_missing_file_names_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    rc_cmd(&dir)
        .arg("import")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"))
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn explicit_data_dir_overrides_env() {
    let dir = TempDir::new().unwrap();
    let explicit = TempDir::new().unwrap();
    rc_cmd(&dir)
        .arg("--data-dir")
        .arg(explicit.path())
        .args(["init", "--curator", CURATOR, "--oracle", ORACLE, "--keeper", KEEPER])
        .assert()
        .success();
    assert!(explicit.path().join("config.toml").exists());
    assert!(!dir.path().join("config.toml").exists());
}
