//! wavjoin core engine
//!
//! This crate implements the WAV container engine used by the `wavjoin` CLI:
//! - `parser` - validates RIFF/WAVE/PCM buffers and extracts the audio payload
//! - `header` - builds bit-exact 44-byte canonical PCM headers
//! - `join` - concatenates ordered payloads into a single WAV buffer
//! - `mime` - resolves `audio/L16;rate=24000` style descriptors
//!
//! # Overview
//!
//! The engine works on complete in-memory buffers. It never reads files,
//! never retains caller buffers, and every output is freshly allocated.
//! Format incompatibilities between joined inputs are reported as advisory
//! [`CompatibilityWarning`]s rather than errors; only an empty join or a
//! payload that cannot be described by a 32-bit RIFF size fails.
//!
//! # Example
//!
//! ```
//! use wavjoin_core::{decode, join, AudioPayload, FormatParameters, JoinRequest};
//!
//! let format = FormatParameters::mono(44100);
//! let a = wavjoin_core::to_wav(&AudioPayload::new(vec![0u8; 100]), &format).unwrap();
//! let b = wavjoin_core::to_wav(&AudioPayload::new(vec![0u8; 200]), &format).unwrap();
//!
//! let mut request = JoinRequest::new();
//! for (name, bytes) in [("a.wav", &a), ("b.wav", &b)] {
//!     let (payload, format) = decode(bytes).unwrap();
//!     request.push(payload, format, name);
//! }
//!
//! let output = join(request).unwrap();
//! assert_eq!(output.wav.len(), 44 + 300);
//! assert!(output.warnings.is_empty());
//! ```

pub mod error;
pub mod format;
pub mod header;
pub mod join;
pub mod mime;
pub mod parser;
pub mod payload;

pub use error::{WavError, WavResult};
pub use format::FormatParameters;
pub use header::{build_header, to_wav, write_wav, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use join::{
    join, CompatibilityWarning, FormatField, JoinEntry, JoinOutput, JoinRequest, WarningKind,
};
pub use mime::{resolve, DEFAULT_BITS_PER_SAMPLE, DEFAULT_SAMPLE_RATE};
pub use parser::{decode, extract_payload, parse};
pub use payload::AudioPayload;
