//! Inspect command implementation
//!
//! Parses a WAV file and reports its format, payload size and duration.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use wavjoin_core::decode;

use super::json_output::{error_codes, InspectOutput, InspectResult, JsonError};
use super::reporting::{format_bytes, format_duration, print_format};

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to the WAV file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if the file parsed, 1 otherwise
pub fn run(input: &Path, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(input)
    } else {
        run_human(input)
    }
}

fn run_human(input: &Path) -> Result<ExitCode> {
    println!("{} {}", "Inspecting:".cyan().bold(), input.display());

    let result = inspect_file(input)?;

    println!("\n{}", "Format:".bold());
    print_format(&result.format);
    println!("  {} {}", "Byte rate:".dimmed(), result.format.byte_rate);
    println!("  {} {}", "Block align:".dimmed(), result.format.block_align);
    if !result.header_consistent {
        println!(
            "  {} stored byte rate / block align do not match channels, rate and bit depth",
            "!".yellow()
        );
    }

    println!("\n{}", "Payload:".bold());
    println!(
        "  {} {} bytes",
        "Audio data:".dimmed(),
        format_bytes(result.payload_bytes)
    );
    println!("  {} {}", "Frames:".dimmed(), format_bytes(result.frames));
    if !result.frame_aligned {
        println!("  {} payload ends in a partial frame", "!".yellow());
    }
    println!(
        "  {} {}",
        "Duration:".dimmed(),
        format_duration(result.duration_seconds)
    );
    println!("  {} {}", "PCM hash:".dimmed(), result.pcm_hash);
    println!("  {} {}", "File hash:".dimmed(), result.file_hash);

    Ok(ExitCode::SUCCESS)
}

fn run_json(input: &Path) -> Result<ExitCode> {
    let (output, code) = match inspect_file(input) {
        Ok(result) => (InspectOutput::success(result), ExitCode::SUCCESS),
        Err(e) => {
            let error = JsonError::from_anyhow(error_codes::FILE_READ, &e)
                .with_file(input.display().to_string());
            (InspectOutput::failure(vec![error]), ExitCode::from(1))
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

fn inspect_file(input: &Path) -> Result<InspectResult> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let (payload, format) =
        decode(&data).with_context(|| format!("Failed to parse {}", input.display()))?;

    Ok(InspectResult {
        file: input.display().to_string(),
        format,
        header_consistent: format.is_consistent(),
        payload_bytes: payload.len(),
        frames: format.frame_count(payload.len()),
        frame_aligned: payload.is_frame_aligned(format.normalized().block_align),
        duration_seconds: format.duration_seconds(payload.len()),
        pcm_hash: payload.pcm_hash(),
        file_hash: blake3::hash(&data).to_hex().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavjoin_core::{to_wav, AudioPayload, FormatParameters};

    #[test]
    fn test_inspect_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tone.wav");
        let format = FormatParameters::stereo(48000);
        fs::write(&path, to_wav(&AudioPayload::new(vec![0; 19200]), &format).unwrap()).unwrap();

        let result = inspect_file(&path).unwrap();
        assert_eq!(result.format, format);
        assert!(result.header_consistent);
        assert_eq!(result.payload_bytes, 19200);
        assert_eq!(result.frames, 4800);
        assert!(result.frame_aligned);
        assert!((result.duration_seconds - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_partial_frame_detected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("odd.wav");
        let format = FormatParameters::mono(8000);
        fs::write(&path, to_wav(&AudioPayload::new(vec![0; 5]), &format).unwrap()).unwrap();

        let result = inspect_file(&path).unwrap();
        assert!(!result.frame_aligned);
        assert_eq!(result.frames, 2);
    }

    #[test]
    fn test_json_failure_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("garbage.wav");
        fs::write(&path, b"not a wav").unwrap();

        assert_eq!(run(&path, true).unwrap(), ExitCode::from(1));
        assert!(run(&path, false).is_err());
    }
}
