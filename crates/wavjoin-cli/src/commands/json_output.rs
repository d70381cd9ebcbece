//! JSON output types for machine-readable CLI output.
//!
//! These types back the `--json` flag on every command and the `--report`
//! file of `join`, so scripts can consume results without scraping the
//! colored terminal output.

use serde::Serialize;
use wavjoin_core::{CompatibilityWarning, FormatParameters};

/// Error codes for CLI operations.
///
/// Engine failures pass through their own `WAV_xxx` codes.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// No usable input files after expansion
    pub const NO_INPUTS: &str = "CLI_002";
    /// Manifest could not be read or has the wrong shape
    pub const MANIFEST: &str = "CLI_003";
    /// Output file could not be written
    pub const WRITE: &str = "CLI_004";
}

/// Warning codes for CLI operations.
pub mod warning_codes {
    /// An input argument was skipped (missing, unmatched, not a WAV)
    pub const INPUT_SKIPPED: &str = "CLI_W001";
    /// Segments declared different MIME descriptors
    pub const MIME_MISMATCH: &str = "CLI_W002";
    /// Output was redirected to the temp directory
    pub const OUTPUT_REDIRECTED: &str = "CLI_W003";
    /// A standalone segment file could not be written
    pub const INDIVIDUAL_WRITE: &str = "CLI_W004";
    /// Requested ids not present in the manifest
    pub const MISSING_IDS: &str = "CLI_W005";
    /// Raw payload does not end on a frame boundary
    pub const PARTIAL_FRAME: &str = "CLI_W006";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "WAV_002")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Builds an error from an `anyhow` chain, using the engine's code when
    /// the root cause is a [`wavjoin_core::WavError`].
    pub fn from_anyhow(fallback_code: &str, err: &anyhow::Error) -> Self {
        let code = err
            .downcast_ref::<wavjoin_core::WavError>()
            .map(|e| e.code())
            .unwrap_or(fallback_code);
        Self::new(code, format!("{:#}", err))
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "CLI_W001")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonWarning {
    /// Creates a new warning with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path for this warning.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Per-input outcome of a join.
#[derive(Debug, Clone, Serialize)]
pub struct InputResult {
    /// Input path or segment id
    pub source: String,
    /// Whether the input contributed audio
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// Description of a written WAV file.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenWav {
    /// Where the file was written
    pub output: String,
    /// Format stored in the header
    pub format: FormatParameters,
    /// Payload size in bytes
    pub payload_bytes: usize,
    /// Total file size in bytes
    pub file_bytes: usize,
    /// Approximate duration
    pub duration_seconds: f64,
    /// BLAKE3 hash of the payload
    pub pcm_hash: String,
}

/// JSON output (and report file) for the `join` command.
#[derive(Debug, Clone, Serialize)]
pub struct JoinCommandOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    /// Advisory format warnings from the joiner
    pub compatibility: Vec<CompatibilityWarning>,
    /// Inputs in join order
    pub inputs: Vec<InputResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WrittenWav>,
}

/// Parsed header details reported by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct InspectResult {
    pub file: String,
    pub format: FormatParameters,
    /// Whether stored byte_rate/block_align match the derived values
    pub header_consistent: bool,
    pub payload_bytes: usize,
    pub frames: usize,
    pub frame_aligned: bool,
    pub duration_seconds: f64,
    pub pcm_hash: String,
    pub file_hash: String,
}

/// JSON output for the `inspect` command.
#[derive(Debug, Clone, Serialize)]
pub struct InspectOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<InspectResult>,
}

impl InspectOutput {
    pub fn success(result: InspectResult) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// JSON output for the `wrap` command.
#[derive(Debug, Clone, Serialize)]
pub struct WrapOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    /// Descriptor the format was resolved from
    pub mime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WrittenWav>,
}

/// JSON output for the `assemble` command.
#[derive(Debug, Clone, Serialize)]
pub struct AssembleOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    pub compatibility: Vec<CompatibilityWarning>,
    /// Segments in manifest order
    pub segments: Vec<InputResult>,
    pub succeeded_ids: Vec<String>,
    pub failed_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_file: Option<String>,
    pub individual_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WrittenWav>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use wavjoin_core::WavError;

    #[test]
    fn test_error_skips_missing_file() {
        let json = serde_json::to_value(JsonError::new(error_codes::FILE_READ, "nope")).unwrap();
        assert_eq!(json["code"], "CLI_001");
        assert!(json.get("file").is_none());
    }

    #[test]
    fn test_from_anyhow_keeps_engine_code() {
        let err = Err::<(), _>(WavError::MissingChunk { chunk: "data" })
            .context("Failed to parse a.wav")
            .unwrap_err();
        let json = JsonError::from_anyhow(error_codes::FILE_READ, &err);
        assert_eq!(json.code, "WAV_002");
        assert!(json.message.contains("a.wav"));
        assert!(json.message.contains("missing 'data' chunk"));
    }

    #[test]
    fn test_from_anyhow_falls_back() {
        let err = anyhow::anyhow!("disk on fire");
        let json = JsonError::from_anyhow(error_codes::FILE_READ, &err);
        assert_eq!(json.code, error_codes::FILE_READ);
    }

    #[test]
    fn test_inspect_failure_shape() {
        let output = InspectOutput::failure(vec![JsonError::new("WAV_001", "bad").with_file("x.wav")]);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["file"], "x.wav");
        assert!(json.get("result").is_none());
    }
}
