use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::f64::consts::PI;
use std::path::Path;
use tempfile::TempDir;

use squat_coach::models::{Landmark, LandmarkIndex, PoseFrame, NUM_LANDMARKS};

/// Frontal squat frame with the hips at `hip_y`
fn frame(i: usize, hip_y: f64) -> PoseFrame {
    let shoulder_y = hip_y - 0.22;
    let mut landmarks = [Landmark::new(0.5, shoulder_y - 0.12, 0.0, 0.9); NUM_LANDMARKS];
    let mut set = |idx: LandmarkIndex, x: f64, y: f64| {
        landmarks[idx as usize] = Landmark::new(x, y, 0.0, 0.9);
    };
    set(LandmarkIndex::LeftShoulder, 0.375, shoulder_y);
    set(LandmarkIndex::RightShoulder, 0.625, shoulder_y);
    set(LandmarkIndex::LeftHip, 0.44, hip_y);
    set(LandmarkIndex::RightHip, 0.56, hip_y);
    set(LandmarkIndex::LeftKnee, 0.42, 0.62);
    set(LandmarkIndex::RightKnee, 0.58, 0.62);
    set(LandmarkIndex::LeftAnkle, 0.4, 0.9);
    set(LandmarkIndex::RightAnkle, 0.6, 0.9);
    set(LandmarkIndex::LeftHeel, 0.4, 0.91);
    set(LandmarkIndex::RightHeel, 0.6, 0.91);
    set(LandmarkIndex::LeftFootIndex, 0.4, 0.93);
    set(LandmarkIndex::RightFootIndex, 0.6, 0.93);

    PoseFrame::new(i as f64 / 30.0, landmarks)
}

/// Detection stream JSON: standing padding, `reps` squats, standing padding,
/// plus one frame where the detector found nobody
fn write_stream(dir: &Path, name: &str, reps: usize, pad: usize) -> std::path::PathBuf {
    let total = reps * 30 + 2 * pad;
    let mut entries: Vec<Value> = (0..total)
        .map(|i| {
            let hip_y = if i < pad || i >= pad + reps * 30 {
                0.5
            } else {
                0.625 - 0.125 * (2.0 * PI * (i - pad) as f64 / 30.0).cos()
            };
            serde_json::to_value(frame(i, hip_y)).unwrap()
        })
        .collect();
    entries.push(json!({ "timestamp": total as f64 / 30.0, "landmarks": null }));

    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();
    path
}

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("squat-coach").unwrap();
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("squat-coach").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("squat form analysis"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("trim"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("squat-coach").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let mut cmd = Command::cargo_bin("squat-coach").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("complete -F"))
        .stdout(predicate::str::contains("squat-coach"));
}

#[test]
fn test_analyze_text_report() {
    let dir = TempDir::new().unwrap();
    let input = write_stream(dir.path(), "squats.json", 3, 0);

    cli(&dir)
        .arg("analyze")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reps: 3"))
        .stdout(predicate::str::contains("Camera: frontal"))
        .stdout(predicate::str::contains("Knee tracking"));
}

#[test]
fn test_analyze_json_report() {
    let dir = TempDir::new().unwrap();
    let input = write_stream(dir.path(), "squats.json", 3, 0);

    let output = cli(&dir)
        .arg("analyze")
        .arg(&input)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["repCount"], 3);
    assert_eq!(report["exerciseType"], "squat");
    assert_eq!(report["reps"].as_array().unwrap().len(), 3);
}

#[test]
fn test_analyze_motionless_clip_fails_with_guidance() {
    let dir = TempDir::new().unwrap();
    let input = write_stream(dir.path(), "standing.json", 0, 45);

    cli(&dir)
        .arg("analyze")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No squat repetition detected"))
        .stderr(predicate::str::contains("Record at least one full squat"));
}

#[test]
fn test_pipeline_errors_are_reported_once() {
    let dir = TempDir::new().unwrap();
    let input = write_stream(dir.path(), "standing.json", 0, 45);

    for (command, step) in [("analyze", "Analysis failed"), ("trim", "Trim failed")] {
        let output = cli(&dir).arg(command).arg(&input).output().unwrap();
        assert!(!output.status.success());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(stderr.matches("No squat repetition detected").count(), 1, "{command}: {stderr}");
        assert_eq!(stderr.matches("Record at least one full squat").count(), 1, "{command}: {stderr}");
        assert!(stderr.contains(step), "{command}: {stderr}");
        assert!(stderr.contains('✗'), "{command}: {stderr}");
    }
}

#[test]
fn test_analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .arg("analyze")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read landmark file"));
}

#[test]
fn test_trim_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_stream(dir.path(), "padded.json", 3, 150);
    let output = dir.path().join("trimmed.json");

    cli(&dir)
        .arg("trim")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Trimmed to frames"));

    let clip: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let start = clip["startFrame"].as_u64().unwrap();
    let end = clip["endFrame"].as_u64().unwrap();
    assert!(start < 150 && end >= 240);
    assert_eq!(clip["frames"].as_array().unwrap().len() as u64, end - start + 1);
}

#[test]
fn test_config_path_honors_flag() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_with_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trim_buffer_seconds"))
        .stdout(predicate::str::contains("reject_non_squat"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = TempDir::new().unwrap();

    cli(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.toml").exists());

    cli(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
