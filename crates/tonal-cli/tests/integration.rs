//! Integration tests for tonal-cli.
//!
//! Every command runs against `--dry-run`, so no sound card is needed, and
//! against a config file in a temp directory, so the user's settings are
//! never read.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to get the path to the `tonal` binary built by cargo.
fn tonal_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tonal"))
}

/// Write a config into `dir` and return its path.
fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

fn run(dir: &TempDir, config: &str, args: &[&str]) -> Output {
    let config = write_config(dir.path(), config);
    tonal_bin()
        .arg("--dry-run")
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("failed to run tonal")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// `tonal notes`
// ---------------------------------------------------------------------------

#[test]
fn cli_notes_lists_the_table() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "", &["notes"]);
    assert!(output.status.success(), "tonal notes failed");

    let out = stdout(&output);
    assert!(out.contains("A4"));
    assert!(out.contains("440.00"));
    assert!(out.contains("C0"));
    assert!(out.contains("B8"));
}

#[test]
fn cli_notes_filters_by_octave() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "", &["notes", "--octave", "4"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("A4"));
    assert!(!out.contains("A3"));
    assert!(out.contains("17 note(s)"));
}

// ---------------------------------------------------------------------------
// `tonal play` / `tonal sequence`
// ---------------------------------------------------------------------------

#[test]
fn cli_play_note_completes() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "", &["play", "A4", "--duration", "0.1"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains("freq=440"));
}

#[test]
fn cli_play_with_instrument() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "",
        &["play", "220", "-d", "0.05", "-i", "A4", "-s", "3"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("k=3"));
}

#[test]
fn cli_play_unknown_note_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "", &["play", "Q9"]);
    assert!(!output.status.success());
}

#[test]
fn cli_play_rejects_bad_volume() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "", &["play", "A4", "--volume", "1.5"]);
    assert!(!output.status.success());
}

#[test]
fn cli_sequence_repeats() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "",
        &["sequence", "C4:0.05", "G4:0.05:0.3", "--repeat", "2"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains("Playing 4 clip(s)"));
}

#[test]
fn cli_sequence_rejects_huge_repeat() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "",
        &["sequence", "A4:0.05", "--repeat", "18446744073709551615"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
}

#[test]
fn cli_sequence_rejects_malformed_clip() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "", &["sequence", "C4:slow"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `tonal render`
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_wav() {
    let dir = TempDir::new().unwrap();
    let wav = dir.path().join("out.wav");
    let output = run(
        &dir,
        "",
        &[
            "render",
            wav.to_str().unwrap(),
            "A4:0.25",
            "E4:0.25",
        ],
    );
    assert!(output.status.success());

    let pcm = tonal_io::read_wav(&wav).unwrap();
    assert_eq!(pcm.sample_rate(), 8000);
    assert_eq!(pcm.len(), 4000);
}

#[test]
fn cli_render_uses_config_sample_rate() {
    let dir = TempDir::new().unwrap();
    let wav = dir.path().join("out.wav");
    let output = run(
        &dir,
        "sample_rate = 16000\n",
        &["render", wav.to_str().unwrap(), "A4:0.5", "--repeat", "3"],
    );
    assert!(output.status.success());

    let pcm = tonal_io::read_wav(&wav).unwrap();
    assert_eq!(pcm.sample_rate(), 16000);
    assert_eq!(pcm.len(), 24000);
}

// ---------------------------------------------------------------------------
// `tonal bank`
// ---------------------------------------------------------------------------

#[test]
fn cli_bank_warm_builds_then_loads() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank").join("sounds.json");
    let config = format!("duration = 0.02\nbank_path = '{}'\n", bank.display());

    let first = run(&dir, &config, &["bank", "warm"]);
    assert!(
        first.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    assert!(stdout(&first).contains("Built"));
    assert!(bank.exists());

    let second = run(&dir, &config, &["bank", "warm"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Loaded"));
}

#[test]
fn cli_bank_play_unknown_note_fails() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("sounds.json");
    let config = format!("duration = 0.02\nbank_path = '{}'\n", bank.display());

    let output = run(&dir, &config, &["bank", "play", "organ", "H2"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// Config handling
// ---------------------------------------------------------------------------

#[test]
fn cli_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "volume = 3.0\n", &["notes"]);
    assert!(!output.status.success());
}

#[test]
fn cli_missing_explicit_config_fails() {
    let output = tonal_bin()
        .args(["--dry-run", "--config", "/nonexistent/tonal/config.toml", "notes"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
