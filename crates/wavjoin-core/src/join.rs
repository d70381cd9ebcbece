//! Ordered concatenation of PCM payloads into a single WAV buffer.
//!
//! The reference format is the override when one is given, otherwise the
//! format of the first entry. Every other entry is compared against that
//! reference on channels, sample rate and bit depth. Mismatches become
//! [`CompatibilityWarning`]s; the payload is still included. Payloads are
//! concatenated strictly in the order they were pushed.

use std::fmt;

use serde::Serialize;

use crate::error::{WavError, WavResult};
use crate::format::FormatParameters;
use crate::header::{build_header, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::payload::AudioPayload;

/// One payload to join, with its format and a caller-chosen identifier
/// (file name, segment id, ...) used in warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEntry {
    pub payload: AudioPayload,
    pub format: FormatParameters,
    pub source: String,
}

/// An ordered list of entries plus an optional override format.
///
/// Consumed by [`join`].
#[derive(Debug, Clone, Default)]
pub struct JoinRequest {
    entries: Vec<JoinEntry>,
    override_format: Option<FormatParameters>,
}

impl JoinRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the output format instead of taking it from the first entry.
    pub fn with_override(mut self, format: FormatParameters) -> Self {
        self.override_format = Some(format);
        self
    }

    pub fn set_override(&mut self, format: Option<FormatParameters>) {
        self.override_format = format;
    }

    /// Appends an entry; entries are joined in push order.
    pub fn push(&mut self, payload: AudioPayload, format: FormatParameters, source: impl Into<String>) {
        self.entries.push(JoinEntry {
            payload,
            format,
            source: source.into(),
        });
    }

    pub fn push_entry(&mut self, entry: JoinEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JoinEntry] {
        &self.entries
    }

    pub fn override_format(&self) -> Option<&FormatParameters> {
        self.override_format.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<JoinEntry> for JoinRequest {
    fn from_iter<I: IntoIterator<Item = JoinEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            override_format: None,
        }
    }
}

/// Format field compared between joined entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatField {
    Channels,
    SampleRate,
    BitsPerSample,
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatField::Channels => write!(f, "channels"),
            FormatField::SampleRate => write!(f, "sample rate"),
            FormatField::BitsPerSample => write!(f, "bits per sample"),
        }
    }
}

/// What an advisory warning is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// A format field differs from the reference.
    FormatMismatch {
        field: FormatField,
        expected: u32,
        found: u32,
    },
    /// The payload does not end on a frame boundary of the reference format.
    PartialFrame { payload_len: usize, block_align: u16 },
}

/// Advisory warning attached to one entry of a join. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityWarning {
    /// Position of the entry in the request.
    pub index: usize,
    /// Identifier the entry was pushed with.
    pub source: String,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for CompatibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::FormatMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "{}: {} ({} vs {})",
                self.source, field, found, expected
            ),
            WarningKind::PartialFrame {
                payload_len,
                block_align,
            } => write!(
                f,
                "{}: {} bytes is not a multiple of block align {}",
                self.source, payload_len, block_align
            ),
        }
    }
}

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinOutput {
    /// Complete WAV file: canonical header followed by the joined payload.
    pub wav: Vec<u8>,
    /// Format written to the header (normalized reference format).
    pub format: FormatParameters,
    /// Advisory warnings in entry order.
    pub warnings: Vec<CompatibilityWarning>,
}

impl JoinOutput {
    /// The joined payload, without the header.
    pub fn payload(&self) -> &[u8] {
        &self.wav[HEADER_SIZE..]
    }

    pub fn payload_len(&self) -> usize {
        self.wav.len() - HEADER_SIZE
    }

    pub fn duration_seconds(&self) -> f64 {
        self.format.duration_seconds(self.payload_len())
    }
}

/// Joins the entries of `request` into one WAV buffer.
///
/// # Errors
/// - [`WavError::NoUsableAudio`] if the concatenated payload is empty
/// - [`WavError::PayloadTooLarge`] if it exceeds [`MAX_PAYLOAD_SIZE`]
pub fn join(request: JoinRequest) -> WavResult<JoinOutput> {
    let JoinRequest {
        entries,
        override_format,
    } = request;

    let (reference, compared) = match override_format {
        Some(format) => (format.normalized(), &entries[..]),
        None => match entries.first() {
            Some(first) => (first.format.normalized(), &entries[1..]),
            None => return Err(WavError::NoUsableAudio),
        },
    };
    let skipped = entries.len() - compared.len();

    let mut warnings = Vec::new();
    for (offset, entry) in compared.iter().enumerate() {
        compare_format(skipped + offset, entry, &reference, &mut warnings);
    }
    for (index, entry) in entries.iter().enumerate() {
        if !entry.payload.is_frame_aligned(reference.block_align) {
            warnings.push(CompatibilityWarning {
                index,
                source: entry.source.clone(),
                kind: WarningKind::PartialFrame {
                    payload_len: entry.payload.len(),
                    block_align: reference.block_align,
                },
            });
        }
    }
    warnings.sort_by_key(|w| w.index);

    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let total: u64 = entries.iter().map(|e| e.payload.len() as u64).sum();
    if total == 0 {
        return Err(WavError::NoUsableAudio);
    }
    if total > MAX_PAYLOAD_SIZE {
        return Err(WavError::PayloadTooLarge { size: total });
    }

    let header = build_header(total, &reference)?;
    let mut wav = Vec::with_capacity(HEADER_SIZE + total as usize);
    wav.extend_from_slice(&header);
    for entry in &entries {
        wav.extend_from_slice(entry.payload.as_bytes());
    }

    log::debug!(
        "joined {} entries into {} payload bytes ({} warnings)",
        entries.len(),
        total,
        warnings.len()
    );

    Ok(JoinOutput {
        wav,
        format: reference,
        warnings,
    })
}

fn compare_format(
    index: usize,
    entry: &JoinEntry,
    reference: &FormatParameters,
    warnings: &mut Vec<CompatibilityWarning>,
) {
    let fields = [
        (
            FormatField::Channels,
            u32::from(reference.num_channels),
            u32::from(entry.format.num_channels),
        ),
        (
            FormatField::SampleRate,
            reference.sample_rate,
            entry.format.sample_rate,
        ),
        (
            FormatField::BitsPerSample,
            u32::from(reference.bits_per_sample),
            u32::from(entry.format.bits_per_sample),
        ),
    ];

    for (field, expected, found) in fields {
        if expected != found {
            warnings.push(CompatibilityWarning {
                index,
                source: entry.source.clone(),
                kind: WarningKind::FormatMismatch {
                    field,
                    expected,
                    found,
                },
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::to_wav;
    use pretty_assertions::assert_eq;

    fn payload(byte: u8, len: usize) -> AudioPayload {
        AudioPayload::new(vec![byte; len])
    }

    #[test]
    fn test_single_entry_matches_to_wav() {
        let format = FormatParameters::mono(44100);
        let mut request = JoinRequest::new();
        request.push(payload(1, 100), format, "a");

        let output = join(request).unwrap();
        assert_eq!(output.wav, to_wav(&payload(1, 100), &format).unwrap());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let format = FormatParameters::mono(16000);
        let mut ab = JoinRequest::new();
        ab.push(payload(0xA, 4), format, "a");
        ab.push(payload(0xB, 6), format, "b");

        let mut ba = JoinRequest::new();
        ba.push(payload(0xB, 6), format, "b");
        ba.push(payload(0xA, 4), format, "a");

        assert_eq!(join(ab).unwrap().payload(), &[0xA, 0xA, 0xA, 0xA, 0xB, 0xB, 0xB, 0xB, 0xB, 0xB]);
        assert_eq!(join(ba).unwrap().payload(), &[0xB, 0xB, 0xB, 0xB, 0xB, 0xB, 0xA, 0xA, 0xA, 0xA]);
    }

    #[test]
    fn test_mismatch_is_advisory_and_first_wins() {
        let mut request = JoinRequest::new();
        request.push(payload(0, 8), FormatParameters::mono(44100), "first.wav");
        request.push(payload(0, 8), FormatParameters::mono(22050), "second.wav");

        let output = join(request).unwrap();
        assert_eq!(output.format, FormatParameters::mono(44100));
        assert_eq!(output.payload_len(), 16);
        assert_eq!(
            output.warnings,
            vec![CompatibilityWarning {
                index: 1,
                source: "second.wav".to_string(),
                kind: WarningKind::FormatMismatch {
                    field: FormatField::SampleRate,
                    expected: 44100,
                    found: 22050,
                },
            }]
        );
        assert_eq!(
            output.warnings[0].to_string(),
            "second.wav: sample rate (22050 vs 44100)"
        );
    }

    #[test]
    fn test_warnings_itemized_per_field() {
        let mut request = JoinRequest::new();
        request.push(payload(0, 4), FormatParameters::mono(44100), "a");
        request.push(payload(0, 12), FormatParameters::pcm(2, 48000, 24), "b");

        let output = join(request).unwrap();
        let fields: Vec<_> = output
            .warnings
            .iter()
            .filter_map(|w| match w.kind {
                WarningKind::FormatMismatch { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                FormatField::Channels,
                FormatField::SampleRate,
                FormatField::BitsPerSample
            ]
        );
    }

    #[test]
    fn test_override_compares_every_entry() {
        let forced = FormatParameters::stereo(48000);
        let mut request = JoinRequest::new().with_override(forced);
        request.push(payload(0, 8), FormatParameters::mono(48000), "a");
        request.push(payload(0, 8), FormatParameters::stereo(48000), "b");

        let output = join(request).unwrap();
        assert_eq!(output.format, forced);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].index, 0);
        assert_eq!(&output.wav[22..24], &2u16.to_le_bytes());
    }

    #[test]
    fn test_partial_frame_warns_but_keeps_bytes() {
        let format = FormatParameters::stereo(44100);
        let mut request = JoinRequest::new();
        request.push(payload(1, 8), format, "whole");
        request.push(payload(2, 6), format, "ragged");

        let output = join(request).unwrap();
        assert_eq!(output.payload_len(), 14);
        assert_eq!(
            output.warnings[0].kind,
            WarningKind::PartialFrame {
                payload_len: 6,
                block_align: 4
            }
        );
    }

    #[test]
    fn test_empty_payloads_are_no_usable_audio() {
        let mut request = JoinRequest::new();
        request.push(AudioPayload::default(), FormatParameters::mono(8000), "empty");
        assert_eq!(join(request).unwrap_err(), WavError::NoUsableAudio);
        assert_eq!(join(JoinRequest::new()).unwrap_err(), WavError::NoUsableAudio);
        assert_eq!(
            join(JoinRequest::new().with_override(FormatParameters::mono(8000))).unwrap_err(),
            WavError::NoUsableAudio
        );
    }

    #[test]
    fn test_empty_entry_among_others_is_skipped_silently() {
        let format = FormatParameters::mono(8000);
        let mut request = JoinRequest::new();
        request.push(AudioPayload::default(), format, "empty");
        request.push(payload(5, 2), format, "real");

        let output = join(request).unwrap();
        assert_eq!(output.payload(), &[5, 5]);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_header_uses_recomputed_reference() {
        let mut lying = FormatParameters::mono(8000);
        lying.byte_rate = 1;
        lying.block_align = 9;

        let mut request = JoinRequest::new();
        request.push(payload(0, 4), lying, "a");
        let output = join(request).unwrap();
        assert_eq!(output.format, FormatParameters::mono(8000));
        assert!((output.duration_seconds() - 0.00025).abs() < 1e-12);
    }
}
