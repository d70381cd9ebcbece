use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use wavjoin_core::{CompatibilityWarning, FormatParameters, HEADER_SIZE};

use super::json_output::WrittenWav;

/// Formats a byte count with thousands separators, e.g. `1,234,567`.
pub(crate) fn format_bytes(bytes: usize) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"1.5 minutes (90.0 seconds)"`.
pub(crate) fn format_duration(seconds: f64) -> String {
    format!("{:.1} minutes ({:.1} seconds)", seconds / 60.0, seconds)
}

/// Describes a written WAV buffer for JSON output.
pub(crate) fn describe_written(path: &Path, format: &FormatParameters, wav: &[u8]) -> WrittenWav {
    let payload = &wav[HEADER_SIZE.min(wav.len())..];
    WrittenWav {
        output: path.display().to_string(),
        format: *format,
        payload_bytes: payload.len(),
        file_bytes: wav.len(),
        duration_seconds: format.duration_seconds(payload.len()),
        pcm_hash: blake3::hash(payload).to_hex().to_string(),
    }
}

pub(crate) fn print_format(format: &FormatParameters) {
    println!("  {} {}", "Channels:".dimmed(), format.num_channels);
    println!("  {} {} Hz", "Sample rate:".dimmed(), format.sample_rate);
    println!("  {} {}", "Bits per sample:".dimmed(), format.bits_per_sample);
}

/// Prints the compatibility warnings block after a join.
pub(crate) fn print_compatibility_warnings(warnings: &[CompatibilityWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n{}", "Compatibility warnings:".yellow().bold());
    for warning in warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
    println!(
        "  {}",
        "The inputs were combined anyway; playback of the result may be affected.".dimmed()
    );
}

/// Prints the summary block for a written WAV.
pub(crate) fn print_written_summary(written: &WrittenWav) {
    println!("\n{}", "=".repeat(60));
    println!("{} {}", "Output:".bold(), written.output);
    println!(
        "  {} {} bytes",
        "Audio data:".dimmed(),
        format_bytes(written.payload_bytes)
    );
    println!(
        "  {} {} bytes ({:.1} MB)",
        "File size:".dimmed(),
        format_bytes(written.file_bytes),
        written.file_bytes as f64 / (1024.0 * 1024.0)
    );
    if written.duration_seconds > 0.0 {
        println!(
            "  {} {}",
            "Duration:".dimmed(),
            format_duration(written.duration_seconds)
        );
    }
    println!("  {} {}", "PCM hash:".dimmed(), &written.pcm_hash[..16]);
}

/// Outcome of an `assemble` run, as written to the results file.
#[derive(Debug, Default)]
pub(crate) struct ResultsSummary<'a> {
    /// `None` when every manifest entry was processed
    pub requested_ids: Option<&'a BTreeSet<String>>,
    pub succeeded: &'a [String],
    pub failed: &'a [String],
}

/// Renders the plain-text results file.
pub(crate) fn render_results(summary: &ResultsSummary<'_>, now: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== AUDIO PROCESSING RESULTS ===");
    let _ = writeln!(out, "Date and time: {}\n", now.format("%Y-%m-%d %H:%M:%S"));

    match summary.requested_ids {
        Some(ids) => {
            let listed: Vec<&str> = ids.iter().map(String::as_str).collect();
            let _ = writeln!(out, "Requested IDs: [{}]", listed.join(", "));
            let _ = writeln!(out, "Total requested IDs: {}\n", ids.len());
        }
        None => {
            let _ = writeln!(out, "Mode: process all available IDs\n");
        }
    }

    write_id_list(&mut out, "Successfully processed IDs", summary.succeeded, '✓');
    out.push('\n');
    write_id_list(&mut out, "Failed IDs", summary.failed, '✗');

    let succeeded = summary.succeeded.len();
    let failed = summary.failed.len();
    let total = succeeded + failed;
    let _ = writeln!(out, "\nSummary:");
    let _ = writeln!(out, "  Total processed: {}", total);
    let _ = writeln!(out, "  Succeeded: {}", succeeded);
    let _ = writeln!(out, "  Failed: {}", failed);
    if total > 0 {
        let rate = succeeded as f64 / total as f64 * 100.0;
        let _ = writeln!(out, "  Success rate: {:.1}%", rate);
    }
    out
}

fn write_id_list(out: &mut String, heading: &str, ids: &[String], marker: char) {
    let _ = writeln!(out, "{} ({}):", heading, ids.len());
    if ids.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    let mut sorted: Vec<&String> = ids.iter().collect();
    sorted.sort();
    for id in sorted {
        let _ = writeln!(out, "  {} {}", marker, id);
    }
}

/// Writes the results file.
pub(crate) fn write_results_file(path: &Path, summary: &ResultsSummary<'_>) -> Result<()> {
    let contents = render_results(summary, Local::now());
    fs::write(path, contents)
        .with_context(|| format!("Failed to write results file: {}", path.display()))
}
