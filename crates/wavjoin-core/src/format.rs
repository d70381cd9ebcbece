//! PCM format parameters.

use serde::Serialize;

/// Format tag for linear PCM, the only encoding the engine writes.
pub const PCM_FORMAT_TAG: u16 = 1;

/// Canonical description of a PCM stream.
///
/// `block_align` and `byte_rate` are derived fields. Values read from an
/// untrusted header are kept as-is so they can be inspected, but anything the
/// engine writes goes through [`FormatParameters::normalized`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FormatParameters {
    /// Format tag (1 = linear PCM).
    pub audio_format: u16,
    /// Number of channels (1 = mono, 2 = stereo).
    pub num_channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bytes per second (`sample_rate * block_align`).
    pub byte_rate: u32,
    /// Bytes per sample frame (`num_channels * bits_per_sample / 8`).
    pub block_align: u16,
    /// Bits per sample, a multiple of 8.
    pub bits_per_sample: u16,
}

impl FormatParameters {
    /// Creates linear PCM parameters with derived fields computed.
    pub fn pcm(num_channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = derive_block_align(num_channels, bits_per_sample);
        Self {
            audio_format: PCM_FORMAT_TAG,
            num_channels,
            sample_rate,
            byte_rate: sample_rate.saturating_mul(u32::from(block_align)),
            block_align,
            bits_per_sample,
        }
    }

    /// Creates 16-bit mono PCM parameters.
    pub fn mono(sample_rate: u32) -> Self {
        Self::pcm(1, sample_rate, 16)
    }

    /// Creates 16-bit stereo PCM parameters.
    pub fn stereo(sample_rate: u32) -> Self {
        Self::pcm(2, sample_rate, 16)
    }

    /// Returns a copy with the PCM tag set and derived fields recomputed from
    /// channels, rate and bit depth.
    pub fn normalized(&self) -> Self {
        Self::pcm(self.num_channels, self.sample_rate, self.bits_per_sample)
    }

    /// Whether the stored `block_align` and `byte_rate` agree with the values
    /// derived from channels, rate and bit depth.
    pub fn is_consistent(&self) -> bool {
        let derived = self.normalized();
        self.block_align == derived.block_align && self.byte_rate == derived.byte_rate
    }

    /// Whether this describes linear PCM.
    pub fn is_pcm(&self) -> bool {
        self.audio_format == PCM_FORMAT_TAG
    }

    /// Bytes per sample per channel.
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Number of whole frames in a payload of `payload_len` bytes.
    pub fn frame_count(&self, payload_len: usize) -> usize {
        let block_align = self.normalized().block_align as usize;
        if block_align == 0 {
            0
        } else {
            payload_len / block_align
        }
    }

    /// Duration in seconds of a payload of `payload_len` bytes, or 0.0 when
    /// the rate or frame size is zero.
    pub fn duration_seconds(&self, payload_len: usize) -> f64 {
        let byte_rate = self.normalized().byte_rate;
        if byte_rate == 0 {
            0.0
        } else {
            payload_len as f64 / byte_rate as f64
        }
    }
}

fn derive_block_align(num_channels: u16, bits_per_sample: u16) -> u16 {
    let bytes = u32::from(num_channels) * u32::from(bits_per_sample / 8);
    bytes.min(u32::from(u16::MAX)) as u16
}
