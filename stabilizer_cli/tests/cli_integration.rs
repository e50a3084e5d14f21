use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config; quiet console logs so stderr only carries errors
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[stabilizer]
window_size = 5
weight_threshold = 0.5

[display]
resolution = 0.1
decimal_places = 1

[runner]
sample_rate_hz = 1000
display_every = 1

[simulation]
baseline_g = 0.0
noise_g = 0.05
spike_g = 25.0
spike_every = 37
seed = 1

[logging]
level = "error"
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_trace(dir: &tempfile::TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = fs::File::create(&path).unwrap();
    for l in lines {
        writeln!(f, "{l}").unwrap();
    }
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["simulate", "--samples", "50"], 0, "Stabilizer Summary", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["replay", "--input", "missing.csv", "--every", "0"], 2, "invalid value", "stderr")]
#[case(&["simulate", "--load-at", "5"], 2, "--load-g", "stderr")]
#[case(&["replay", "--input", "/definitely/not/here.csv"], 4, "trace", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("stabilizer").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn replay_prints_changes_and_summary() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let mut lines = vec!["t_ms,reading".to_string()];
    for i in 0..12 {
        lines.push(format!("{},20.0", i * 100));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let trace = write_trace(&dir, "trace.csv", &refs);

    Command::cargo_bin("stabilizer")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--input")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Samples: 12"))
        .stdout(predicate::str::contains("Final: 20.0"));
}

#[rstest]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[stabilizer]\nwindow_size = 2\nweight_threshold = 0.5\n",
    )
    .unwrap();

    Command::cargo_bin("stabilizer")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("window_size"));
}

#[rstest]
fn missing_config_file_exits_with_config_code() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("stabilizer")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[rstest]
fn cli_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let bad = write_trace(&dir, "bad.csv", &["time,value", "0,1.0", "100,1.0"]);

    Command::cargo_bin("stabilizer")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--input")
        .arg(&bad)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("t_ms,reading"));
}

#[rstest]
fn backwards_timestamps_are_rejected() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let bad = write_trace(&dir, "back.csv", &["t_ms,reading", "100,1.0", "50,1.0"]);

    Command::cargo_bin("stabilizer")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--input")
        .arg(&bad)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("non-decreasing"));
}
