//! Input discovery and naming helpers.
//!
//! Expands paths, glob patterns and directories into an ordered,
//! de-duplicated list of `.wav` files, and derives output names.

use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Fallback base name when sanitising leaves nothing.
pub const DEFAULT_BASE_NAME: &str = "audio_test";

static DIGITS_REGEX: OnceLock<Regex> = OnceLock::new();
static UNSAFE_CHARS_REGEX: OnceLock<Regex> = OnceLock::new();

fn digits_regex() -> &'static Regex {
    DIGITS_REGEX.get_or_init(|| Regex::new(r"\d+").expect("invalid regex pattern"))
}

fn unsafe_chars_regex() -> &'static Regex {
    UNSAFE_CHARS_REGEX.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("invalid regex pattern"))
}

/// How to order the discovered inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep command-line order (glob and directory matches sorted by name).
    #[default]
    AsGiven,
    /// Lexicographic by full path.
    Alphabetical,
    /// By the integer runs in the file name, so `part2` precedes `part10`.
    Numeric,
}

/// Result of expanding command-line inputs.
#[derive(Debug, Default)]
pub struct InputSelection {
    /// WAV files in join order.
    pub files: Vec<PathBuf>,
    /// Human-readable notes about skipped inputs.
    pub warnings: Vec<String>,
}

/// Whether an argument should be treated as a glob pattern.
pub fn is_glob_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expands paths, glob patterns and directories into WAV files.
///
/// Missing paths and patterns without matches are reported as warnings.
/// Duplicates (by canonical path) keep their first position. Files without a
/// `.wav` extension are skipped with a warning.
pub fn expand_inputs(inputs: &[String]) -> InputSelection {
    let mut selection = InputSelection::default();
    let mut candidates = Vec::new();

    for arg in inputs {
        if is_glob_pattern(arg) {
            match glob::glob(arg) {
                Ok(paths) => {
                    let mut matched: Vec<PathBuf> = paths.filter_map(|p| p.ok()).collect();
                    if matched.is_empty() {
                        selection
                            .warnings
                            .push(format!("No files match pattern '{}'", arg));
                    }
                    matched.sort();
                    candidates.extend(matched);
                }
                Err(e) => selection
                    .warnings
                    .push(format!("Invalid pattern '{}': {}", arg, e)),
            }
            continue;
        }

        let path = PathBuf::from(arg);
        if path.is_dir() {
            let found = wav_files_in(&path);
            if found.is_empty() {
                selection
                    .warnings
                    .push(format!("No .wav files found in directory: {}", arg));
            }
            candidates.extend(found);
        } else if path.exists() {
            candidates.push(path);
        } else {
            selection.warnings.push(format!("File not found: {}", arg));
        }
    }

    let mut seen = HashSet::new();
    for path in candidates {
        if !seen.insert(canonical(&path)) {
            continue;
        }
        if has_wav_extension(&path) {
            selection.files.push(path);
        } else {
            selection
                .warnings
                .push(format!("Skipping non-WAV file: {}", path.display()));
        }
    }

    selection
}

/// Recursively collects `.wav` files under a directory, sorted by path.
fn wav_files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_wav_extension(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Case-insensitive `.wav` extension check.
pub fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Sorts inputs in place. The sort is stable.
pub fn sort_inputs(files: &mut [PathBuf], order: SortOrder) {
    match order {
        SortOrder::AsGiven => {}
        SortOrder::Alphabetical => files.sort(),
        SortOrder::Numeric => files.sort_by_cached_key(|p| numeric_sort_key(p)),
    }
}

/// The integer runs in a file name, e.g. `take3_part12.wav` -> `[3, 12]`.
/// Names without digits map to `[0]`.
pub fn numeric_sort_key(path: &Path) -> Vec<u64> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let numbers: Vec<u64> = digits_regex()
        .find_iter(&name)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .collect();
    if numbers.is_empty() {
        vec![0]
    } else {
        numbers
    }
}

/// `<stem>_combined.wav` next to the first input.
pub fn default_output_path(first_input: &Path) -> PathBuf {
    let stem = first_input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
    first_input.with_file_name(format!("{}_combined.wav", stem))
}

/// Appends `.wav` unless the path already ends with it (any case).
pub fn ensure_wav_extension(path: PathBuf) -> PathBuf {
    if has_wav_extension(&path) {
        path
    } else {
        let mut raw = path.into_os_string();
        raw.push(".wav");
        PathBuf::from(raw)
    }
}

/// Makes a string safe to use as a file name component.
///
/// Replaces any of `<>:"/\|?*` with `_` and trims whitespace; an empty
/// result falls back to [`DEFAULT_BASE_NAME`].
pub fn sanitize_name(name: &str) -> String {
    let cleaned = unsafe_chars_regex().replace_all(name, "_");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}
