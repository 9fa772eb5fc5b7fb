//! CLI integration tests for the `iconsheet custom` command.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn iconsheet_binary() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_iconsheet") {
        return PathBuf::from(path);
    }
    for candidate in ["target/release/iconsheet", "target/debug/iconsheet"] {
        let path = Path::new(candidate);
        if path.exists() {
            return path.canonicalize().expect("should resolve binary path");
        }
    }
    panic!("iconsheet binary not found. Run 'cargo build' first.");
}

/// Run `iconsheet custom` in `dir` and return (stdout, stderr, exit code).
fn run_custom(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(iconsheet_binary())
        .arg("custom")
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute iconsheet");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

#[test]
fn test_list_empty_table() {
    let temp = TempDir::new().expect("should create temp dir");
    let (stdout, _, code) = run_custom(temp.path(), &["list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No custom icons"));
}

#[test]
fn test_add_then_list() {
    let temp = TempDir::new().expect("should create temp dir");

    let (stdout, _, code) = run_custom(temp.path(), &["add", "1186", "111", "Celebi", "--shiny", "222"]);
    assert_eq!(code, 0, "add should succeed");
    assert!(stdout.contains("use as icon #1185 in game"));
    assert!(stdout.contains("Shiny: rbxassetid://222"));

    let table = std::fs::read_to_string(temp.path().join("custom_icons.toml")).expect("table written");
    assert!(table.contains("[[icon]]"));
    assert!(table.contains("slot = 1186"));

    let (stdout, _, code) = run_custom(temp.path(), &["list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Celebi"));
    assert!(stdout.contains("Total: 1 custom icons"));
    assert!(stdout.contains("Next sequential slot: 1187"));
}

#[test]
fn test_add_conflict_rejected() {
    let temp = TempDir::new().expect("should create temp dir");
    let (_, _, code) = run_custom(temp.path(), &["add", "1186", "111", "Celebi"]);
    assert_eq!(code, 0);

    let (_, stderr, code) = run_custom(temp.path(), &["add", "1186", "333", "Jirachi"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("already used by 'Celebi'"), "stderr: {}", stderr);
    assert!(stderr.contains("Next available slot: 1187"));

    // The table was not modified.
    let table = std::fs::read_to_string(temp.path().join("custom_icons.toml")).expect("table exists");
    assert!(!table.contains("Jirachi"));
}

#[test]
fn test_gaps_and_next() {
    let temp = TempDir::new().expect("should create temp dir");
    for (slot, label) in [("1145", "A"), ("1147", "B"), ("1150", "C")] {
        let (_, _, code) = run_custom(temp.path(), &["add", slot, "1", label]);
        assert_eq!(code, 0);
    }

    let (stdout, _, code) = run_custom(temp.path(), &["gaps"]);
    assert_eq!(code, 0);
    let gaps: Vec<&str> = stdout.lines().collect();
    assert_eq!(gaps, vec!["1146", "1148", "1149"]);

    let (stdout, _, code) = run_custom(temp.path(), &["next", "--from", "1147"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1148");
}

#[test]
fn test_highest_slot_has_no_successor() {
    let temp = TempDir::new().expect("should create temp dir");
    let (_, _, code) = run_custom(temp.path(), &["add", "4294967295", "1", "Last"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_custom(temp.path(), &["list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Next sequential slot: none"), "stdout: {}", stdout);

    let (_, stderr, code) = run_custom(temp.path(), &["next", "--from", "4294967295"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("No free slot"), "stderr: {}", stderr);
}

#[test]
fn test_explicit_table_path() {
    let temp = TempDir::new().expect("should create temp dir");
    let (_, _, code) = run_custom(temp.path(), &["add", "1200", "9", "Zorua", "--table", "other.toml"]);
    assert_eq!(code, 0);
    assert!(temp.path().join("other.toml").exists());
    assert!(!temp.path().join("custom_icons.toml").exists());
}

#[test]
fn test_table_path_from_config() {
    let temp = TempDir::new().expect("should create temp dir");
    std::fs::write(temp.path().join("iconsheet.toml"), "[table]\npath = \"data/icons.toml\"\n")
        .expect("should write config");

    let nested = temp.path().join("raw");
    std::fs::create_dir(&nested).expect("should create dir");
    let (_, _, code) = run_custom(&nested, &["add", "1190", "5", "Eevee"]);
    assert_eq!(code, 0);

    // Resolved relative to the config file, not the working directory.
    assert!(temp.path().join("data").join("icons.toml").exists());
}

#[test]
fn test_duplicate_slot_file_rejected() {
    let temp = TempDir::new().expect("should create temp dir");
    std::fs::write(
        temp.path().join("custom_icons.toml"),
        "[[icon]]\nslot = 1186\nnormal = \"1\"\n\n[[icon]]\nslot = 1186\nnormal = \"2\"\n",
    )
    .expect("should write table");

    let (_, stderr, code) = run_custom(temp.path(), &["list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("more than once"), "stderr: {}", stderr);
}
