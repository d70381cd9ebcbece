//! Join command implementation
//!
//! Combines several WAV files into one. Inputs are loaded concurrently but
//! joined in the order given; files that fail to load are skipped and
//! reported, and format mismatches are downgraded to warnings.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wavjoin_core::{decode, AudioPayload, FormatParameters, JoinRequest};

use crate::error_log::ErrorLog;
use crate::input::{self, SortOrder};
use crate::output::write_output;
use crate::producer::produce_ordered;

use super::json_output::{
    error_codes, warning_codes, InputResult, JoinCommandOutput, JsonError, JsonWarning,
};
use super::reporting::{
    describe_written, format_bytes, print_compatibility_warnings, print_format,
    print_written_summary,
};

/// Options for the join command.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// Paths, glob patterns, or directories
    pub inputs: Vec<String>,
    /// Output path (default: `<first-stem>_combined.wav`)
    pub output: Option<PathBuf>,
    pub sort: SortOrder,
    pub max_workers: usize,
    /// Forced output format instead of the first input's
    pub override_format: Option<FormatParameters>,
    /// Where to write a JSON report
    pub report: Option<PathBuf>,
    /// Output machine-readable JSON instead of colored text
    pub json: bool,
}

/// Run the join command
///
/// # Returns
/// Exit code: 0 when an output file was written, 1 otherwise
pub fn run(options: &JoinOptions, error_log: &ErrorLog) -> Result<ExitCode> {
    let human = !options.json;
    let mut report = JoinCommandOutput {
        success: false,
        errors: Vec::new(),
        warnings: Vec::new(),
        compatibility: Vec::new(),
        inputs: Vec::new(),
        result: None,
    };

    let selection = input::expand_inputs(&options.inputs);
    for warning in &selection.warnings {
        if human {
            println!("{} {}", "Warning:".yellow(), warning);
        }
        report
            .warnings
            .push(JsonWarning::new(warning_codes::INPUT_SKIPPED, warning.clone()));
    }

    let mut files = selection.files;
    if files.is_empty() {
        let message = "No WAV files found to process";
        error_log.record(message);
        report.errors.push(JsonError::new(error_codes::NO_INPUTS, message));
        return finish(options, &report, human.then_some(message));
    }
    input::sort_inputs(&mut files, options.sort);

    let output_path = input::ensure_wav_extension(
        options
            .output
            .clone()
            .unwrap_or_else(|| input::default_output_path(&files[0])),
    );

    if human {
        println!("\n{}", "=== FILES TO COMBINE ===".cyan().bold());
        for (i, file) in files.iter().enumerate() {
            println!("{:2}. {}", i + 1, file.display());
        }
        println!("Total: {} files", files.len());
        println!("Output: {}\n", output_path.display());
    }

    let loaded = produce_ordered(files.len(), options.max_workers, |i| load_wav(&files[i]))?;

    let mut request = JoinRequest::new();
    if let Some(format) = options.override_format {
        request.set_override(Some(format));
    }

    let total = files.len();
    for (i, (path, result)) in files.iter().zip(loaded).enumerate() {
        let source = path.display().to_string();
        let name = display_name(path);
        if human {
            let progress = format!("[{}/{}]", i + 1, total).cyan().bold();
            println!("{} {}", progress, name);
        }

        match result {
            Ok((payload, format)) => {
                if human && request.is_empty() && options.override_format.is_none() {
                    println!("  {}", "Reference format (first file):".dimmed());
                    print_format(&format);
                }
                if human {
                    println!(
                        "  {} Added ({} bytes)",
                        "✓".green(),
                        format_bytes(payload.len())
                    );
                }
                report.inputs.push(InputResult {
                    source,
                    success: true,
                    payload_bytes: Some(payload.len()),
                    format: Some(format),
                    error: None,
                });
                request.push(payload, format, name);
            }
            Err(e) => {
                if human {
                    println!("  {} Error processing {}: {:#}", "✗".red(), name, e);
                }
                error_log.record(format!("Error processing {}: {:#}", source, e));
                report.inputs.push(InputResult {
                    source: source.clone(),
                    success: false,
                    payload_bytes: None,
                    format: None,
                    error: Some(JsonError::from_anyhow(error_codes::FILE_READ, &e).with_file(source)),
                });
            }
        }
    }

    let joined = match wavjoin_core::join(request) {
        Ok(joined) => joined,
        Err(e) => {
            error_log.record(format!("Join failed: {}", e));
            report.errors.push(JsonError::new(e.code(), e.to_string()));
            let message = format!("Could not combine inputs: {}", e);
            return finish(options, &report, human.then_some(message.as_str()));
        }
    };

    for warning in &joined.warnings {
        error_log.record(format!("Incompatible input {}", warning));
    }
    if human {
        print_compatibility_warnings(&joined.warnings);
        println!(
            "\nCreating combined WAV ({} bytes of audio)...",
            format_bytes(joined.payload_len())
        );
    }
    report.compatibility = joined.warnings.clone();

    let written = match write_output(&output_path, &joined.wav, error_log) {
        Ok(written) => written,
        Err(e) => {
            report
                .errors
                .push(JsonError::from_anyhow(error_codes::WRITE, &e));
            let message = format!("{:#}", e);
            return finish(options, &report, human.then_some(message.as_str()));
        }
    };
    if let Some(reason) = &written.fallback_reason {
        if human {
            println!("{} {}", "Warning:".yellow(), reason);
        }
        report
            .warnings
            .push(JsonWarning::new(warning_codes::OUTPUT_REDIRECTED, reason.clone()));
    }

    let description = describe_written(&written.path, &joined.format, &joined.wav);
    if human {
        println!("\n{}", "Combination completed successfully!".green().bold());
        print_written_summary(&description);
        let skipped = report.inputs.iter().filter(|r| !r.success).count();
        if skipped > 0 {
            println!(
                "  {} {} of {} inputs skipped",
                "!".yellow(),
                skipped,
                report.inputs.len()
            );
        }
    }

    report.success = true;
    report.result = Some(description);
    finish(options, &report, None)
}

/// Writes the report and JSON output, returning the exit code.
fn finish(options: &JoinOptions, report: &JoinCommandOutput, failure: Option<&str>) -> Result<ExitCode> {
    if let Some(path) = &options.report {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if let Some(message) = failure {
        eprintln!("\n{} {}", "✗".red().bold(), message.red());
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Reads and parses one WAV file.
pub(crate) fn load_wav(path: &Path) -> Result<(AudioPayload, FormatParameters)> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
