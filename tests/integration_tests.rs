use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Test utilities for video processing
mod test_utils {
    use super::*;

    pub fn ffmpeg_available() -> bool {
        StdCommand::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Create a 320x240 30 fps test clip with a sine tone using FFmpeg
    pub fn create_test_video(output_path: &Path, duration: f64) {
        let duration = duration.to_string();
        let output = StdCommand::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                "testsrc=size=320x240:rate=30",
                "-f",
                "lavfi",
                "-i",
                "sine=frequency=1000",
                "-t",
                duration.as_str(),
                "-c:v",
                "mpeg4",
                "-pix_fmt",
                "yuv420p",
                "-c:a",
                "aac",
                "-y",
            ])
            .arg(output_path)
            .output()
            .unwrap();

        assert!(
            output.status.success(),
            "FFmpeg failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Command for the binary, isolated from the caller's environment
    pub fn reelmark(workdir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("reelmark").unwrap();
        cmd.current_dir(workdir);
        for key in [
            "REELMARK_CAPTION",
            "REELMARK_INPUT_DIR",
            "REELMARK_OUTPUT_DIR",
            "REELMARK_CAPTION_FILE",
            "REELMARK_START_NUMBER",
            "REELMARK_OVERLAY_SECONDS",
            "REELMARK_PRESERVE_INPUT",
            "REELMARK_FFMPEG",
            "REELMARK_AUDIO_CODEC",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }

    pub fn json_stdout(output: &std::process::Output) -> Value {
        serde_json::from_slice(&output.stdout).unwrap()
    }

    pub fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

use test_utils::*;

#[test]
fn test_layout_command_prints_geometry() {
    let temp = TempDir::new().unwrap();
    let output = reelmark(temp.path())
        .args(["layout", "--caption", "Top five beaches", "--width", "1080", "--height", "1920"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let layout = json_stdout(&output);
    let lines = layout["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["text"], "Video 1 | Top");
    assert_eq!(lines[1]["text"], "five beaches");

    let bounds = &layout["bounds"];
    let width = bounds["width"].as_i64().unwrap();
    assert_eq!(bounds["y"], 250);
    assert_eq!(bounds["x"].as_i64().unwrap(), (1080 - width).div_euclid(2));
}

#[test]
fn test_layout_command_uses_number_and_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("reelmark.toml"), "[banner]\ntop_margin = 40\nwords_per_line = 2\n").unwrap();

    let output = reelmark(temp.path())
        .args(["layout", "--caption", "hello", "--number", "12", "--width", "640", "--height", "360"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let layout = json_stdout(&output);
    assert_eq!(layout["bounds"]["y"], 40);
    let texts: Vec<&str> = layout["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["Video 12", "| hello"]);
}

#[test]
fn test_run_with_empty_input_reports_no_input() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("chunks");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("readme.txt"), "not a video").unwrap();

    reelmark(temp.path())
        .args(["run", "--input-dir", "chunks", "--output-dir", "out", "--caption", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No video files found in 'chunks'"));

    assert_eq!(names(&input), vec!["readme.txt"]);
    assert!(temp.path().join("out").is_dir());
}

#[test]
fn test_run_json_report_for_missing_input_dir() {
    let temp = TempDir::new().unwrap();

    let output = reelmark(temp.path())
        .args(["run", "--json", "--caption", "x"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report = json_stdout(&output);
    assert_eq!(report["status"], "no_input");
    assert_eq!(report["input_dir"], "output/chunks");
    assert_eq!(report["output_dir"], "processed_videos");
    assert!(temp.path().join("processed_videos").is_dir());
}

#[test]
fn test_caption_read_from_caption_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("userText.txt"), "From the file\nignored\n").unwrap();

    let output = reelmark(temp.path())
        .args(["run", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["caption"], "From the file");
}

#[test]
fn test_missing_config_file_fails() {
    let temp = TempDir::new().unwrap();
    reelmark(temp.path())
        .args(["run", "--config", "absent.toml", "--caption", "x"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_value_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("reelmark.toml"), "[banner]\nwords_per_line = 0\n").unwrap();
    reelmark(temp.path())
        .args(["run", "--caption", "x"])
        .assert()
        .failure();
}

#[test]
fn test_full_batch_with_audio() {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not installed, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("output").join("chunks");
    fs::create_dir_all(&input).unwrap();
    for name in ["a.mp4", "b.mp4", "c.mp4"] {
        create_test_video(&input.join(name), 2.0);
    }

    let output = reelmark(temp.path())
        .args(["run", "--json", "--caption", "Top five beaches", "--overlay-seconds", "1"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = json_stdout(&output);
    assert_eq!(report["status"], "completed");
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["chunk"]["number"], i as u64 + 1);
        assert_eq!(result["outcome"]["kind"], "with_audio");
        assert_eq!(result["stats"]["frames_written"], 60);
        assert_eq!(result["stats"]["overlay_frames"], 30);
    }

    let out_dir = temp.path().join("processed_videos");
    assert_eq!(names(&out_dir), vec!["video_1.mp4", "video_2.mp4", "video_3.mp4"]);
    assert!(names(&input).is_empty());
}

#[test]
fn test_missing_encoder_produces_silent_outputs() {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not installed, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("chunks");
    fs::create_dir_all(&input).unwrap();
    create_test_video(&input.join("only.mp4"), 1.0);
    fs::write(input.join("broken.mp4"), b"definitely not a video").unwrap();

    let output = reelmark(temp.path())
        .args([
            "run",
            "--json",
            "--input-dir",
            "chunks",
            "--output-dir",
            "out",
            "--caption",
            "x",
            "--ffmpeg",
            "reelmark-missing-ffmpeg",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = json_stdout(&output);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results[0]["chunk"]["path"], "chunks/broken.mp4");
    assert_eq!(results[0]["outcome"]["kind"], "skipped");
    assert_eq!(results[1]["outcome"]["kind"], "without_audio");
    assert_eq!(names(&temp.path().join("out")), vec!["video_2.mp4"]);
}
