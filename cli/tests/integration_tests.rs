use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const BIN: &str = env!("CARGO_BIN_EXE_androidstat");

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("discovery")
        .join("tests")
        .join("fixtures")
        .join("meminfo-app.txt")
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run androidstat")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Stands in for a device: `sh shell <cmd> ...` runs the script named
/// `shell` in `dir`, answering like `adb shell <cmd> ...` would. `pidof`
/// exits 1 for packages that are not running, and `com.crashing.app` has a
/// pid whose dumpsys fails.
fn fake_device(dir: &Path) {
    let script = format!(
        r#"case "$1" in
  pidof)
    case "$2" in
      com.example.app) echo "4242 4300" ;;
      com.crashing.app) echo "5151" ;;
      *) exit 1 ;;
    esac ;;
  dumpsys)
    if [ "$3" = "5151" ]; then echo "Can't find service: meminfo" >&2; exit 1; fi
    cat '{}' ;;
  ps)
    printf 'NAME\ninit\n[kthreadd]\ncom.example.app\n' ;;
  *)
    echo "unsupported: $1" >&2; exit 1 ;;
esac
"#,
        fixture_path().display()
    );
    fs::write(dir.join("shell"), script).expect("failed to write device script");
}

fn run_on_device(dir: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .current_dir(dir)
        .arg("--adb")
        .arg("sh")
        .args(args)
        .output()
        .expect("failed to run androidstat")
}

// ---------------------------------------------------------------------------
// Offline parsing
// ---------------------------------------------------------------------------

#[test]
fn parse_file_outputs_every_metric_as_json() {
    let path = fixture_path();
    let output = run(&["parse-file", "--input", path.to_str().unwrap()]);
    let json = stdout_json(&output);

    let metrics = json.as_object().unwrap();
    assert_eq!(metrics.len(), 94);
    assert_eq!(json["MEM TOTAL Pss Total"], 21236);
    assert_eq!(json["APP Java Heap: Rss(KB)"], 14540);
    assert_eq!(json["OBJECTS Proxy Binders"], 32);
    assert_eq!(json["SQL MALLOC_SIZE"], 117);
}

#[test]
fn parse_file_filters_yaml_output() {
    let path = fixture_path();
    let output = run(&[
        "parse-file",
        "--input",
        path.to_str().unwrap(),
        "--format",
        "yaml",
        "--filter",
        "^SQL ",
    ]);
    assert!(output.status.success());

    let metrics: std::collections::BTreeMap<String, i64> =
        serde_yaml::from_slice(&output.stdout).unwrap();
    let keys: Vec<_> = metrics.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["SQL MALLOC_SIZE", "SQL MEMORY_USED", "SQL PAGECACHE_OVERFLOW"]
    );
}

#[test]
fn parse_file_table_lists_sorted_rows() {
    let path = fixture_path();
    let output = run(&[
        "parse-file",
        "--input",
        path.to_str().unwrap(),
        "--format",
        "table",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert!(lines[0].starts_with("Name"));
    assert!(lines[2].starts_with("APP Code: Pss(KB)"));
    assert!(stdout.contains("MEM TOTAL Pss Total"));
    assert_eq!(lines.len(), 96);
}

#[test]
fn parse_stdin_reads_piped_output() {
    let text = fs::read_to_string(fixture_path()).unwrap();
    let mut child = Command::new(BIN)
        .args(["parse-stdin", "--filter", "^OBJECTS "])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(text.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let json = stdout_json(&output);
    assert_eq!(json.as_object().unwrap().len(), 13);
    assert_eq!(json["OBJECTS Views"], 11);
}

#[test]
fn parse_file_without_marker_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.txt");
    fs::write(&path, "Applications Memory Usage (in Kilobytes):\nUptime: 1\n").unwrap();

    let output = run(&["parse-file", "--input", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error: invalid response format (no memory overview found)"),
        "stderr: {stderr}"
    );
}

#[test]
fn parse_file_with_unusable_overview_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("headless.txt");
    fs::write(
        &path,
        "** MEMINFO in pid 1 [com.example.app] **\n   Pss\n  Total\n\n",
    )
    .unwrap();

    let output = run(&["parse-file", "--input", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no memory info found"), "stderr: {stderr}");
}

#[test]
fn parse_file_missing_input_fails() {
    let output = run(&["parse-file", "--input", "/nonexistent/meminfo.txt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"), "stderr: {stderr}");
}

#[test]
fn invalid_filter_is_reported() {
    let path = fixture_path();
    let output = run(&[
        "parse-file",
        "--input",
        path.to_str().unwrap(),
        "--filter",
        "(unclosed",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid filter"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// Device commands
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn packages_lists_process_names() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(dir.path(), &["packages"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["init", "com.example.app"]);
}

#[cfg(unix)]
#[test]
fn meminfo_single_capture_as_json() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(
        dir.path(),
        &["meminfo", "--package", "com.example.app", "--format", "json"],
    );
    let json = stdout_json(&output);
    assert_eq!(json["package"], "com.example.app");
    assert_eq!(json["pid"], 4242);
    assert_eq!(json["metrics"].as_object().unwrap().len(), 94);
}

#[cfg(unix)]
#[test]
fn meminfo_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());
    let csv = dir.path().join("meminfo.csv");

    let output = run_on_device(
        dir.path(),
        &[
            "meminfo",
            "--package",
            "com.example.app",
            "--output",
            csv.to_str().unwrap(),
            "--output-filter",
            "^SQL ",
        ],
    );
    assert!(output.status.success());

    let text = fs::read_to_string(&csv).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Time;SQL MALLOC_SIZE;SQL MEMORY_USED;SQL PAGECACHE_OVERFLOW"
    );
    assert!(lines[1].ends_with(";117;341;74"));
}

#[cfg(unix)]
#[test]
fn meminfo_watch_stops_after_count() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());
    let csv = dir.path().join("watch.csv");

    let output = run_on_device(
        dir.path(),
        &[
            "meminfo",
            "--package",
            "com.example.app",
            "--interval",
            "1",
            "--count",
            "2",
            "--output",
            csv.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ACTIVE"));
    assert!(stdout.contains("T1000"));
    assert!(stdout.contains("[2; rate=1/1sec]"));
    assert_eq!(fs::read_to_string(&csv).unwrap().lines().count(), 3);
}

#[cfg(unix)]
#[test]
fn meminfo_watch_keeps_polling_while_process_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(
        dir.path(),
        &[
            "meminfo",
            "--package",
            "com.other.app",
            "--interval",
            "1",
            "--count",
            "2",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INACTIVE"));
    assert!(stdout.contains("[2; rate=1/1sec]"));
}

#[cfg(unix)]
#[test]
fn meminfo_watch_shows_failed_dump_as_inactive() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(
        dir.path(),
        &[
            "meminfo",
            "--package",
            "com.crashing.app",
            "--interval",
            "1",
            "--count",
            "1",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INACTIVE"));
    assert!(stdout.contains("(com.crashing.app)"));
}

#[cfg(unix)]
#[test]
fn meminfo_single_capture_reports_failed_dump() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(dir.path(), &["meminfo", "--package", "com.crashing.app"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dumpsys meminfo 5151"), "stderr: {stderr}");
    assert!(stderr.contains("Can't find service"), "stderr: {stderr}");
}

#[cfg(unix)]
#[test]
fn names_lists_sorted_metric_keys() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(dir.path(), &["names", "--package", "com.example.app"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<_> = stdout.lines().collect();
    assert_eq!(names.len(), 94);
    assert_eq!(names[0], "APP Code: Pss(KB)");
    assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
}

#[cfg(unix)]
#[test]
fn unknown_package_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());

    let output = run_on_device(dir.path(), &["meminfo", "--package", "com.other.app"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error: process not found: com.other.app"),
        "stderr: {stderr}"
    );
}

#[cfg(unix)]
#[test]
fn config_file_supplies_adb_path() {
    let dir = tempfile::tempdir().unwrap();
    fake_device(dir.path());
    let config = dir.path().join("androidstat.yml");
    fs::write(&config, "adb_path: sh\ntimeout_ms: 5000\n").unwrap();

    let output = Command::new(BIN)
        .current_dir(dir.path())
        .args(["--config", config.to_str().unwrap(), "packages"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("com.example.app"));
}
