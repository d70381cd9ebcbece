//! MIME-style format descriptor resolution.
//!
//! Streaming text-to-speech sources deliver headerless PCM together with a
//! content type such as `audio/L16;codec=pcm;rate=24000`. This module turns
//! that string into [`FormatParameters`]. Resolution never fails: anything
//! that cannot be parsed keeps its default.

use crate::format::FormatParameters;

/// Bit depth used when the descriptor carries no usable `audio/L<n>` token.
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

/// Sample rate used when the descriptor carries no usable `rate=` parameter.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Streaming sources are always treated as mono.
const STREAM_CHANNELS: u16 = 1;

/// Resolves a MIME-like descriptor into mono PCM format parameters.
///
/// Parameters are separated by `;` and matched case-insensitively:
/// - `audio/L<bits>` sets the bit depth (must be a positive multiple of 8)
/// - `rate=<hz>` sets the sample rate (must be positive)
///
/// ```
/// use wavjoin_core::resolve;
///
/// let format = resolve("audio/L24;rate=48000");
/// assert_eq!(format.bits_per_sample, 24);
/// assert_eq!(format.sample_rate, 48000);
/// assert_eq!(resolve(""), resolve("garbage"));
/// ```
pub fn resolve(mime_like: &str) -> FormatParameters {
    let mut bits_per_sample = DEFAULT_BITS_PER_SAMPLE;
    let mut sample_rate = DEFAULT_SAMPLE_RATE;

    for part in mime_like.split(';') {
        let part = part.trim();
        let lower = part.to_ascii_lowercase();

        if let Some(value) = lower.strip_prefix("rate=") {
            match value.trim().parse::<u32>() {
                Ok(rate) if rate > 0 => sample_rate = rate,
                _ => log::debug!("ignoring unusable rate parameter {:?}", part),
            }
        } else if let Some(value) = lower.strip_prefix("audio/l") {
            match value.trim().parse::<u16>() {
                Ok(bits) if bits > 0 && bits % 8 == 0 => bits_per_sample = bits,
                _ => log::debug!("ignoring unusable sample size in {:?}", part),
            }
        }
    }

    FormatParameters::pcm(STREAM_CHANNELS, sample_rate, bits_per_sample)
}
