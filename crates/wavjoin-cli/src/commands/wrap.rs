//! Wrap command implementation
//!
//! Wraps a headerless PCM stream in a canonical WAV header, taking the format
//! from a MIME-style descriptor such as `audio/L16;rate=24000`.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wavjoin_core::{resolve, to_wav, AudioPayload};

use crate::error_log::ErrorLog;
use crate::input::{ensure_wav_extension, has_wav_extension, DEFAULT_BASE_NAME};
use crate::output::write_output;

use super::json_output::{error_codes, warning_codes, JsonError, JsonWarning, WrapOutput};
use super::reporting::{describe_written, print_format, print_written_summary};

/// Run the wrap command
///
/// # Arguments
/// * `raw` - Path to the raw PCM file
/// * `mime` - MIME-style format descriptor
/// * `output` - Output path (default: [`default_wrap_output`])
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 when the WAV was written, 1 otherwise
pub fn run(
    raw: &Path,
    mime: &str,
    output: Option<&Path>,
    json_output: bool,
    error_log: &ErrorLog,
) -> Result<ExitCode> {
    let mut report = WrapOutput {
        success: false,
        errors: Vec::new(),
        warnings: Vec::new(),
        mime: mime.to_string(),
        result: None,
    };

    let target = match output {
        Some(path) => ensure_wav_extension(path.to_path_buf()),
        None => default_wrap_output(raw),
    };

    if let Err(e) = wrap_file(raw, mime, &target, !json_output, error_log, &mut report) {
        if !json_output {
            return Err(e);
        }
        report
            .errors
            .push(JsonError::from_anyhow(error_codes::FILE_READ, &e).with_file(raw.display().to_string()));
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(written) = &report.result {
        println!("\n{}", "Wrapped successfully!".green().bold());
        print_written_summary(written);
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn wrap_file(
    raw: &Path,
    mime: &str,
    target: &Path,
    human: bool,
    error_log: &ErrorLog,
    report: &mut WrapOutput,
) -> Result<()> {
    let format = resolve(mime);
    if human {
        println!("{} {}", "Wrapping:".cyan().bold(), raw.display());
        print_format(&format);
    }

    let bytes = fs::read(raw).with_context(|| format!("Failed to read {}", raw.display()))?;
    let payload = AudioPayload::new(bytes);
    if !payload.is_frame_aligned(format.block_align) {
        let message = format!(
            "{} bytes is not a multiple of block align {}; the last frame is partial",
            payload.len(),
            format.block_align
        );
        if human {
            println!("{} {}", "Warning:".yellow(), message);
        }
        report.warnings.push(
            JsonWarning::new(warning_codes::PARTIAL_FRAME, message)
                .with_file(raw.display().to_string()),
        );
    }

    let wav = to_wav(&payload, &format).with_context(|| format!("Failed to wrap {}", raw.display()))?;

    let written = write_output(target, &wav, error_log)?;
    if let Some(reason) = written.fallback_reason {
        if human {
            println!("{} {}", "Warning:".yellow(), reason);
        }
        report
            .warnings
            .push(JsonWarning::new(warning_codes::OUTPUT_REDIRECTED, reason));
    }

    report.result = Some(describe_written(&written.path, &format, &wav));
    report.success = true;
    Ok(())
}

/// `<raw-stem>.wav` next to the raw file, or `<raw-stem>_wrapped.wav` when
/// the raw file itself already ends in `.wav`.
pub fn default_wrap_output(raw: &Path) -> PathBuf {
    let stem = raw
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
    if has_wav_extension(raw) {
        raw.with_file_name(format!("{}_wrapped.wav", stem))
    } else {
        raw.with_file_name(format!("{}.wav", stem))
    }
}
