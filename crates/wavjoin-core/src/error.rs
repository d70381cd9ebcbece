//! Error types for the WAV engine.

use thiserror::Error;

/// Result type for WAV engine operations.
pub type WavResult<T> = Result<T, WavError>;

/// Errors that can occur while parsing, building, or joining WAV data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WavError {
    /// Buffer is not a well-formed RIFF/WAVE/PCM container.
    #[error("malformed WAV container: {reason}")]
    MalformedContainer {
        /// What was wrong with the container.
        reason: String,
    },

    /// A required sub-chunk was not found.
    #[error("missing '{chunk}' chunk")]
    MissingChunk {
        /// Four-character chunk tag, e.g. `"fmt "` or `"data"`.
        chunk: &'static str,
    },

    /// The `data` chunk declares more bytes than the buffer holds.
    #[error("truncated payload: data chunk declares {declared} bytes but only {available} are present")]
    TruncatedPayload {
        /// Size declared in the `data` chunk header.
        declared: u64,
        /// Bytes actually present after the chunk header.
        available: u64,
    },

    /// Payload does not fit in a 32-bit RIFF chunk size.
    #[error("payload of {size} bytes exceeds the RIFF limit of {} bytes", crate::header::MAX_PAYLOAD_SIZE)]
    PayloadTooLarge {
        /// Requested payload size in bytes.
        size: u64,
    },

    /// A join produced no audio bytes at all.
    #[error("no usable audio: every input was empty or failed")]
    NoUsableAudio,
}

impl WavError {
    /// Creates a malformed container error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            reason: reason.into(),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            WavError::MalformedContainer { .. } => "WAV_001",
            WavError::MissingChunk { .. } => "WAV_002",
            WavError::TruncatedPayload { .. } => "WAV_003",
            WavError::PayloadTooLarge { .. } => "WAV_004",
            WavError::NoUsableAudio => "WAV_005",
        }
    }
}
