//! Integration tests for CLI argument handling and persisted preferences.

use std::{path::Path, process::Command};

/// Run the binary with an isolated home so real config and preferences are
/// never touched.
fn run_cli(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_weatherdash"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("WEATHERDASH_API_KEY")
        .env_remove("WEATHERDASH_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute weatherdash")
}

#[test]
fn test_help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    let output = run_cli(home.path(), &["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["show", "repl", "units", "theme", "history", "configure"] {
        assert!(stdout.contains(cmd), "Help should mention {cmd}: {stdout}");
    }
}

#[test]
fn test_unknown_unit_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = run_cli(home.path(), &["units", "kelvin"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown temperature unit"), "{stderr}");
}

#[test]
fn test_latitude_requires_longitude() {
    let home = tempfile::tempdir().unwrap();
    let output = run_cli(home.path(), &["show", "--lat", "10"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--lon"), "{stderr}");
}

#[test]
fn test_unknown_theme_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = run_cli(home.path(), &["theme", "blue"]);
    assert!(!output.status.success());
}

#[test]
fn test_show_without_api_key_explains_setup() {
    let home = tempfile::tempdir().unwrap();
    let output = run_cli(home.path(), &["show", "Paris"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No API key configured"), "{stderr}");
}

#[test]
fn test_preferences_persist_between_runs() {
    let home = tempfile::tempdir().unwrap();

    assert!(run_cli(home.path(), &["units", "f"]).status.success());
    let toggled = run_cli(home.path(), &["theme", "toggle"]);
    assert!(toggled.status.success());
    assert!(String::from_utf8_lossy(&toggled.stdout).contains("Theme set to dark"));

    let output = run_cli(home.path(), &["prefs"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Temperature unit  Fahrenheit"), "{stdout}");
    assert!(stdout.contains("Theme             dark"), "{stdout}");
    assert!(stdout.contains("No recent searches"), "{stdout}");
}
