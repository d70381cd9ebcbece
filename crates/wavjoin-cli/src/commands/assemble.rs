//! Assemble command implementation
//!
//! Builds one recording out of the segments listed in a manifest. Segments
//! are either WAV files or raw PCM with a MIME-style descriptor. They are
//! loaded concurrently, optionally saved one by one, and joined in manifest
//! order. A plain-text results file is written alongside the output.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wavjoin_core::{decode, resolve, to_wav, AudioPayload, FormatParameters, JoinRequest};

use crate::error_log::ErrorLog;
use crate::input::sanitize_name;
use crate::output::write_output;
use crate::producer::produce_ordered;

use super::json_output::{
    error_codes, warning_codes, AssembleOutput, InputResult, JsonError, JsonWarning,
};
use super::reporting::{
    describe_written, format_bytes, print_compatibility_warnings, print_written_summary,
    write_results_file, ResultsSummary,
};

/// One segment listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub title: String,
    /// Relative to the manifest's directory
    pub path: String,
    /// Present for raw PCM segments; absent means the file is a WAV
    #[serde(default)]
    pub mime: Option<String>,
}

/// Options for the assemble command.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub manifest: PathBuf,
    /// Base name for every output
    pub name: String,
    /// Only these ids, in manifest order
    pub ids: Option<Vec<String>>,
    /// Directory receiving the outputs
    pub out_dir: PathBuf,
    pub max_workers: usize,
    /// Also save each segment as its own WAV
    pub individual: bool,
    pub json: bool,
}

/// Loads and shape-checks a manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid manifest {}: expected an array of {{id, title, path, mime?}}", path.display()))
}

/// Run the assemble command
///
/// # Returns
/// Exit code: 0 when the combined file was written, 1 otherwise
pub fn run(options: &AssembleOptions, error_log: &ErrorLog) -> Result<ExitCode> {
    let human = !options.json;
    let mut report = AssembleOutput {
        success: false,
        errors: Vec::new(),
        warnings: Vec::new(),
        compatibility: Vec::new(),
        segments: Vec::new(),
        succeeded_ids: Vec::new(),
        failed_ids: Vec::new(),
        results_file: None,
        individual_files: Vec::new(),
        result: None,
    };

    let manifest = match load_manifest(&options.manifest) {
        Ok(manifest) => manifest,
        Err(e) => {
            error_log.record(format!("{:#}", e));
            if human {
                return Err(e);
            }
            report
                .errors
                .push(JsonError::from_anyhow(error_codes::MANIFEST, &e));
            return finish(options, &report);
        }
    };
    let manifest_dir = options
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let requested: Option<BTreeSet<String>> =
        options.ids.as_ref().map(|ids| ids.iter().cloned().collect());
    let selected: Vec<&ManifestEntry> = manifest
        .iter()
        .filter(|entry| requested.as_ref().map_or(true, |ids| ids.contains(&entry.id)))
        .collect();

    if let Some(ids) = &requested {
        let known: BTreeSet<&str> = manifest.iter().map(|e| e.id.as_str()).collect();
        let missing: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        if !missing.is_empty() {
            let message = format!("IDs not found in manifest: {}", missing.join(", "));
            if human {
                println!("{} {}", "Warning:".yellow(), message);
            }
            report
                .warnings
                .push(JsonWarning::new(warning_codes::MISSING_IDS, message));
        }
    }

    if selected.is_empty() {
        let message = "No manifest entries selected";
        report.errors.push(JsonError::new(error_codes::NO_INPUTS, message));
        if human {
            eprintln!("{} {}", "✗".red().bold(), message.red());
        }
        return finish(options, &report);
    }

    let base_name = sanitize_name(&options.name);
    if human {
        println!("\n{}", "=== SEGMENTS TO ASSEMBLE ===".cyan().bold());
        println!("Total: {} segments", selected.len());
        println!("Output name: {}\n", base_name);
    }

    let loaded = produce_ordered(selected.len(), options.max_workers, |i| {
        load_segment(&manifest_dir, selected[i])
    })?;

    let audios_dir = options.out_dir.join(format!("{}_audios", base_name));
    let mut request = JoinRequest::new();
    let mut first_mime: Option<(&str, Option<&str>)> = None;
    let total = selected.len();

    for (i, (entry, result)) in selected.iter().zip(loaded).enumerate() {
        if human {
            let progress = format!("[{}/{}]", i + 1, total).cyan().bold();
            println!("{} {}: {}", progress, entry.id, entry.title);
        }

        let (payload, format) = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                if human {
                    println!("  {} {:#}", "✗".red(), e);
                }
                error_log.record(format!("Error processing segment {}: {:#}", entry.id, e));
                report.failed_ids.push(entry.id.clone());
                report.segments.push(InputResult {
                    source: entry.id.clone(),
                    success: false,
                    payload_bytes: None,
                    format: None,
                    error: Some(
                        JsonError::from_anyhow(error_codes::FILE_READ, &e).with_file(entry.path.clone()),
                    ),
                });
                continue;
            }
        };

        if let Some((first_id, mime)) = first_mime {
            if !same_descriptor(mime, entry.mime.as_deref()) {
                let message = format!(
                    "Segment {} declares {} but {} declared {}; using the first format",
                    entry.id,
                    describe_mime(entry.mime.as_deref()),
                    first_id,
                    describe_mime(mime)
                );
                if human {
                    println!("  {} {}", "!".yellow(), message);
                }
                error_log.record(&message);
                report.warnings.push(
                    JsonWarning::new(warning_codes::MIME_MISMATCH, message)
                        .with_file(entry.path.clone()),
                );
            }
        } else {
            first_mime = Some((entry.id.as_str(), entry.mime.as_deref()));
        }

        if options.individual {
            let target = audios_dir.join(format!(
                "{}_{}.wav",
                sanitize_name(&entry.id),
                sanitize_name(&entry.title)
            ));
            match save_individual(&target, &payload, &format, error_log) {
                Ok(path) => report.individual_files.push(path.display().to_string()),
                Err(e) => {
                    let message = format!("Could not save segment {}: {:#}", entry.id, e);
                    if human {
                        println!("  {} {}", "!".yellow(), message);
                    }
                    error_log.record(&message);
                    report.warnings.push(
                        JsonWarning::new(warning_codes::INDIVIDUAL_WRITE, message)
                            .with_file(target.display().to_string()),
                    );
                }
            }
        }

        if human {
            println!(
                "  {} Added ({} bytes)",
                "✓".green(),
                format_bytes(payload.len())
            );
        }
        report.succeeded_ids.push(entry.id.clone());
        report.segments.push(InputResult {
            source: entry.id.clone(),
            success: true,
            payload_bytes: Some(payload.len()),
            format: Some(format),
            error: None,
        });
        request.push(payload, format, entry.id.clone());
    }

    // Failures surface when the results file is written
    let _ = fs::create_dir_all(&options.out_dir);
    let results_path = options.out_dir.join(format!("{}_results.txt", base_name));
    let summary = ResultsSummary {
        requested_ids: requested.as_ref(),
        succeeded: &report.succeeded_ids,
        failed: &report.failed_ids,
    };
    match write_results_file(&results_path, &summary) {
        Ok(()) => report.results_file = Some(results_path.display().to_string()),
        Err(e) => {
            error_log.record(format!("{:#}", e));
            report.errors.push(JsonError::from_anyhow(error_codes::WRITE, &e));
        }
    }

    let joined = match wavjoin_core::join(request) {
        Ok(joined) => joined,
        Err(e) => {
            error_log.record(format!("Assembly of {} failed: {}", base_name, e));
            if human {
                eprintln!("\n{} No audio to combine: {}", "✗".red().bold(), e);
            }
            report.errors.push(JsonError::new(e.code(), e.to_string()));
            return finish(options, &report);
        }
    };

    for warning in &joined.warnings {
        error_log.record(format!("Incompatible segment {}", warning));
    }
    if human {
        print_compatibility_warnings(&joined.warnings);
    }
    report.compatibility = joined.warnings.clone();

    let output_path = options.out_dir.join(format!("{}_complete.wav", base_name));
    let written = match write_output(&output_path, &joined.wav, error_log) {
        Ok(written) => written,
        Err(e) => {
            if human {
                eprintln!("\n{} {:#}", "✗".red().bold(), e);
            }
            report.errors.push(JsonError::from_anyhow(error_codes::WRITE, &e));
            return finish(options, &report);
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
        println!("\n{}", "Assembly completed successfully!".green().bold());
        print_written_summary(&description);
        println!(
            "  {} {} of {} segments",
            "Succeeded:".dimmed(),
            report.succeeded_ids.len(),
            total
        );
        if let Some(results) = &report.results_file {
            println!("  {} {}", "Results:".dimmed(), results);
        }
    }

    report.success = true;
    report.result = Some(description);
    finish(options, &report)
}

fn finish(options: &AssembleOptions, report: &AssembleOutput) -> Result<ExitCode> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Reads one segment, resolving raw PCM through its descriptor.
fn load_segment(manifest_dir: &Path, entry: &ManifestEntry) -> Result<(AudioPayload, FormatParameters)> {
    let path = manifest_dir.join(&entry.path);
    let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    match &entry.mime {
        Some(mime) => Ok((AudioPayload::new(bytes), resolve(mime))),
        None => decode(&bytes).with_context(|| format!("Failed to parse {}", path.display())),
    }
}

fn save_individual(
    target: &Path,
    payload: &AudioPayload,
    format: &FormatParameters,
    error_log: &ErrorLog,
) -> Result<PathBuf> {
    let wav = to_wav(payload, format)?;
    Ok(write_output(target, &wav, error_log)?.path)
}

fn same_descriptor(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        (None, None) => true,
        _ => false,
    }
}

fn describe_mime(mime: Option<&str>) -> String {
    match mime {
        Some(mime) => format!("'{}'", mime),
        None => "a WAV file".to_string(),
    }
}
