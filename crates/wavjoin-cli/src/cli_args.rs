//! CLI argument definitions for the wavjoin command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use wavjoin_cli::error_log::DEFAULT_LOG_FILE;
use wavjoin_cli::input::SortOrder;
use wavjoin_cli::producer::DEFAULT_MAX_WORKERS;
use wavjoin_core::FormatParameters;

/// wavjoin - Join, wrap and inspect PCM WAV files
#[derive(Parser)]
#[command(name = "wavjoin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Append errors to this file
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Do not write an error log file
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Combine WAV files into one, in order
    Join {
        /// WAV files, glob patterns, or directories
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file (default: <first-input>_combined.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sort inputs alphabetically
        #[arg(long, conflicts_with = "sort_numeric")]
        sort: bool,

        /// Sort inputs by the numbers in their file names
        #[arg(long)]
        sort_numeric: bool,

        /// Maximum number of files loaded in parallel
        #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
        max_workers: usize,

        #[command(flatten)]
        format: FormatOverride,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show the format and payload of a WAV file
    Inspect {
        /// WAV file to inspect
        file: PathBuf,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Wrap headerless PCM in a WAV header
    Wrap {
        /// Raw PCM file
        raw: PathBuf,

        /// Format descriptor, e.g. "audio/L16;rate=24000"
        #[arg(long)]
        mime: String,

        /// Output file (default: <raw-stem>.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Build one recording from the segments listed in a manifest
    Assemble {
        /// JSON manifest: [{"id", "title", "path", "mime"?}, ...]
        manifest: PathBuf,

        /// Base name for the outputs
        name: String,

        /// Only assemble these segment ids
        #[arg(long, num_args = 1..)]
        ids: Option<Vec<String>>,

        /// Directory receiving the outputs
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Maximum number of segments loaded in parallel
        #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
        max_workers: usize,

        /// Skip saving each segment as its own WAV
        #[arg(long)]
        no_individual: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

/// Forced output format for `join`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct FormatOverride {
    /// Output channel count (requires --rate and --bits)
    #[arg(long, requires_all = ["rate", "bits"], conflicts_with = "format",
          value_parser = clap::value_parser!(u16).range(1..))]
    pub channels: Option<u16>,

    /// Output sample rate in Hz (requires --channels and --bits)
    #[arg(long, requires_all = ["channels", "bits"],
          value_parser = clap::value_parser!(u32).range(1..))]
    pub rate: Option<u32>,

    /// Output bits per sample (requires --channels and --rate)
    #[arg(long, requires_all = ["channels", "rate"], value_parser = parse_bits)]
    pub bits: Option<u16>,

    /// Output format as a descriptor, e.g. "audio/L16;rate=24000"
    #[arg(long)]
    pub format: Option<String>,
}

impl FormatOverride {
    /// The forced format, if any flag was given.
    pub fn resolve(&self) -> Option<FormatParameters> {
        if let Some(mime) = &self.format {
            return Some(wavjoin_core::resolve(mime));
        }
        match (self.channels, self.rate, self.bits) {
            (Some(channels), Some(rate), Some(bits)) => {
                Some(FormatParameters::pcm(channels, rate, bits))
            }
            _ => None,
        }
    }
}

fn parse_bits(value: &str) -> Result<u16, String> {
    let bits: u16 = value
        .parse()
        .map_err(|_| format!("'{}' is not a bit depth", value))?;
    if bits == 0 || bits % 8 != 0 {
        return Err(format!("{} is not a positive multiple of 8", bits));
    }
    Ok(bits)
}

pub(crate) fn sort_order(sort: bool, sort_numeric: bool) -> SortOrder {
    if sort_numeric {
        SortOrder::Numeric
    } else if sort {
        SortOrder::Alphabetical
    } else {
        SortOrder::AsGiven
    }
}
