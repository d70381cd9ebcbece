//! End-to-end tests for the `wavjoin` binary.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wavjoin-cli --test cli
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::tempdir;

fn wavjoin(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wavjoin"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute wavjoin")
}

/// Writes a 16-bit WAV of `frames` samples per channel with hound.
fn write_tone(path: &Path, channels: u16, sample_rate: u32, frames: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * u32::from(channels) {
        writer.write_sample((i % 100) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn test_join_directory_numeric_order() {
    let tmp = tempdir().unwrap();
    let parts = tmp.path().join("parts");
    fs::create_dir(&parts).unwrap();
    write_tone(&parts.join("part10.wav"), 1, 22050, 300);
    write_tone(&parts.join("part2.wav"), 1, 22050, 200);
    write_tone(&parts.join("part1.wav"), 1, 22050, 100);

    let output = wavjoin(
        tmp.path(),
        &["--no-log-file", "join", "parts", "--sort-numeric", "-o", "all", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report = json_stdout(&output);
    let sources: Vec<String> = report["inputs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| {
            PathBuf::from(i["source"].as_str().unwrap())
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(sources, vec!["part1.wav", "part2.wav", "part10.wav"]);
    assert_eq!(report["result"]["payload_bytes"], 1200);

    let reader = hound::WavReader::open(tmp.path().join("all.wav")).unwrap();
    assert_eq!(reader.spec().sample_rate, 22050);
    assert_eq!(reader.duration(), 600);
}

#[test]
fn test_join_without_usable_inputs_fails() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

    let output = wavjoin(tmp.path(), &["join", "notes.txt", "missing.wav"]);
    assert_eq!(output.status.code(), Some(1));

    // Failures land in the default error log
    let log = fs::read_to_string(tmp.path().join("logs.txt")).unwrap();
    assert!(log.contains("No WAV files found"));
}

#[test]
fn test_inspect_json() {
    let tmp = tempdir().unwrap();
    write_tone(&tmp.path().join("stereo.wav"), 2, 44100, 441);

    let output = wavjoin(tmp.path(), &["--no-log-file", "inspect", "stereo.wav", "--json"]);
    assert!(output.status.success());

    let report = json_stdout(&output);
    assert_eq!(report["result"]["format"]["num_channels"], 2);
    assert_eq!(report["result"]["format"]["block_align"], 4);
    assert_eq!(report["result"]["payload_bytes"], 1764);
    assert_eq!(report["result"]["frames"], 441);
}

#[test]
fn test_inspect_reports_engine_error_code() {
    let tmp = tempdir().unwrap();
    let mut bytes = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    bytes.extend_from_slice(&[16, 0, 0, 0, 1, 0, 1, 0, 0x40, 0x1F, 0, 0, 0x80, 0x3E, 0, 0, 2, 0, 16, 0]);
    bytes.extend_from_slice(b"LIST\x00\x00\x00\x00");
    fs::write(tmp.path().join("nodata.wav"), &bytes).unwrap();

    let output = wavjoin(tmp.path(), &["--no-log-file", "inspect", "nodata.wav", "--json"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json_stdout(&output)["errors"][0]["code"], "WAV_002");
}

#[test]
fn test_wrap_then_join_with_override() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.pcm"), vec![0u8; 2400]).unwrap();
    fs::write(tmp.path().join("b.pcm"), vec![0u8; 4800]).unwrap();

    for raw in ["a.pcm", "b.pcm"] {
        let output = wavjoin(
            tmp.path(),
            &["--no-log-file", "wrap", raw, "--mime", "audio/L16;rate=24000"],
        );
        assert!(output.status.success());
    }

    let output = wavjoin(
        tmp.path(),
        &[
            "--no-log-file",
            "join",
            "a.wav",
            "b.wav",
            "--channels",
            "2",
            "--rate",
            "24000",
            "--bits",
            "16",
            "--report",
            "report.json",
        ],
    );
    assert!(output.status.success());

    let reader = hound::WavReader::open(tmp.path().join("a_combined.wav")).unwrap();
    assert_eq!(reader.spec().channels, 2);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("report.json")).unwrap()).unwrap();
    // Both inputs are mono against a stereo override
    assert_eq!(report["compatibility"].as_array().unwrap().len(), 2);
}

#[test]
fn test_assemble_manifest() {
    let tmp = tempdir().unwrap();
    write_tone(&tmp.path().join("intro.wav"), 1, 24000, 240);
    fs::write(tmp.path().join("body.pcm"), vec![1u8; 960]).unwrap();
    fs::write(
        tmp.path().join("manifest.json"),
        r#"[
            {"id": "1", "title": "Intro", "path": "intro.wav"},
            {"id": "2", "title": "Body", "path": "body.pcm", "mime": "audio/L16;rate=24000"}
        ]"#,
    )
    .unwrap();

    let output = wavjoin(
        tmp.path(),
        &["--no-log-file", "assemble", "manifest.json", "demo", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report = json_stdout(&output);
    assert_eq!(report["succeeded_ids"], serde_json::json!(["1", "2"]));
    // A WAV segment followed by a raw segment counts as differing descriptors
    assert_eq!(report["warnings"][0]["code"], "CLI_W002");

    let reader = hound::WavReader::open(tmp.path().join("demo_complete.wav")).unwrap();
    assert_eq!(reader.duration(), 720);
    assert!(tmp.path().join("demo_audios/1_Intro.wav").exists());
    assert!(tmp.path().join("demo_audios/2_Body.wav").exists());
    assert!(tmp.path().join("demo_results.txt").exists());
}
