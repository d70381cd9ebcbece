//! RIFF/WAVE header parsing and payload extraction.
//!
//! Sub-chunks are located by tag rather than by fixed offset, so optional
//! chunks such as `LIST` or `fact` may appear anywhere before `fmt ` and
//! `data`. The RIFF chunk list is walked first; if a bogus chunk size breaks
//! the walk, the remaining bytes are scanned for the tag instead.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{WavError, WavResult};
use crate::format::FormatParameters;
use crate::header::HEADER_SIZE;
use crate::payload::AudioPayload;

const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

/// Offset of the first sub-chunk, right after `RIFF <size> WAVE`.
const FIRST_CHUNK_OFFSET: usize = 12;

/// Bytes of the `fmt ` body that are read; extended chunks carry more.
const PCM_FMT_BODY: usize = 16;

/// Parses the format parameters of a complete WAV buffer.
///
/// Stored `byte_rate` and `block_align` are returned as found; use
/// [`FormatParameters::normalized`] to obtain derived values.
///
/// # Errors
/// - [`WavError::MalformedContainer`] for short buffers, bad signatures, a
///   truncated `fmt ` body, or a non-PCM / zero-valued format
/// - [`WavError::MissingChunk`] when no `fmt ` chunk exists
pub fn parse(bytes: &[u8]) -> WavResult<FormatParameters> {
    check_container(bytes)?;

    let fmt_pos = locate_chunk(bytes, FMT_TAG).ok_or(WavError::MissingChunk { chunk: "fmt " })?;
    let declared = LittleEndian::read_u32(&bytes[fmt_pos + 4..fmt_pos + 8]) as usize;
    if declared < PCM_FMT_BODY {
        return Err(WavError::malformed(format!(
            "fmt chunk too small: {} bytes (minimum {})",
            declared, PCM_FMT_BODY
        )));
    }

    let body_start = fmt_pos + 8;
    let body = bytes
        .get(body_start..body_start + PCM_FMT_BODY)
        .ok_or_else(|| WavError::malformed(format!("fmt chunk at offset {} is truncated", fmt_pos)))?;

    let params = FormatParameters {
        audio_format: LittleEndian::read_u16(&body[0..2]),
        num_channels: LittleEndian::read_u16(&body[2..4]),
        sample_rate: LittleEndian::read_u32(&body[4..8]),
        byte_rate: LittleEndian::read_u32(&body[8..12]),
        block_align: LittleEndian::read_u16(&body[12..14]),
        bits_per_sample: LittleEndian::read_u16(&body[14..16]),
    };
    check_format(&params)?;

    if !params.is_consistent() {
        log::debug!(
            "stored byte_rate/block_align ({}/{}) disagree with derived values",
            params.byte_rate,
            params.block_align
        );
    }

    Ok(params)
}

/// Extracts exactly the bytes declared by the `data` chunk.
///
/// # Errors
/// - [`WavError::MalformedContainer`] for short buffers or bad signatures
/// - [`WavError::MissingChunk`] when no `data` chunk exists
/// - [`WavError::TruncatedPayload`] when the declared size exceeds the buffer
pub fn extract_payload(bytes: &[u8]) -> WavResult<AudioPayload> {
    check_container(bytes)?;

    let data_pos = locate_chunk(bytes, DATA_TAG).ok_or(WavError::MissingChunk { chunk: "data" })?;
    let start = data_pos + 8;
    let declared = LittleEndian::read_u32(&bytes[data_pos + 4..start]) as u64;
    let available = (bytes.len() - start) as u64;
    if declared > available {
        return Err(WavError::TruncatedPayload {
            declared,
            available,
        });
    }

    Ok(AudioPayload::from_slice(&bytes[start..start + declared as usize]))
}

/// Parses format parameters and extracts the payload in one call.
pub fn decode(bytes: &[u8]) -> WavResult<(AudioPayload, FormatParameters)> {
    let params = parse(bytes)?;
    let payload = extract_payload(bytes)?;
    Ok((payload, params))
}

fn check_container(bytes: &[u8]) -> WavResult<()> {
    if bytes.len() < HEADER_SIZE {
        return Err(WavError::malformed(format!(
            "buffer too short: {} bytes (minimum {} required)",
            bytes.len(),
            HEADER_SIZE
        )));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(WavError::malformed(format!(
            "expected 'RIFF' signature, got {:?}",
            &bytes[0..4]
        )));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(WavError::malformed(format!(
            "expected 'WAVE' form type, got {:?}",
            &bytes[8..12]
        )));
    }
    Ok(())
}

fn check_format(params: &FormatParameters) -> WavResult<()> {
    if !params.is_pcm() {
        return Err(WavError::malformed(format!(
            "unsupported format tag {} (only linear PCM, tag 1, is accepted)",
            params.audio_format
        )));
    }
    if params.num_channels == 0 {
        return Err(WavError::malformed("channel count is zero"));
    }
    if params.sample_rate == 0 {
        return Err(WavError::malformed("sample rate is zero"));
    }
    if params.bits_per_sample == 0 || params.bits_per_sample % 8 != 0 {
        return Err(WavError::malformed(format!(
            "bits per sample must be a positive multiple of 8, got {}",
            params.bits_per_sample
        )));
    }
    Ok(())
}

/// Returns the offset of the chunk tagged `tag`, guaranteeing that its
/// 8-byte chunk header lies inside `bytes`.
fn locate_chunk(bytes: &[u8], tag: &[u8; 4]) -> Option<usize> {
    walk_chunks(bytes, tag).or_else(|| {
        let found = scan_for_tag(bytes, tag);
        if let Some(pos) = found {
            log::debug!(
                "chunk {:?} found by tag scan at offset {}",
                String::from_utf8_lossy(tag),
                pos
            );
        }
        found
    })
}

fn walk_chunks(bytes: &[u8], tag: &[u8; 4]) -> Option<usize> {
    let mut pos = FIRST_CHUNK_OFFSET;
    while pos + 8 <= bytes.len() {
        if &bytes[pos..pos + 4] == tag {
            return Some(pos);
        }
        let size = LittleEndian::read_u32(&bytes[pos + 4..pos + 8]) as usize;
        // Chunks are word aligned
        let padded = size + (size & 1);
        pos = pos.checked_add(8)?.checked_add(padded)?;
    }
    None
}

fn scan_for_tag(bytes: &[u8], tag: &[u8; 4]) -> Option<usize> {
    bytes[FIRST_CHUNK_OFFSET..]
        .windows(4)
        .position(|window| window == tag)
        .map(|offset| offset + FIRST_CHUNK_OFFSET)
        .filter(|&pos| pos + 8 <= bytes.len())
}
