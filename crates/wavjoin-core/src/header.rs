//! Canonical 44-byte PCM WAV header construction.
//!
//! The header layout is fixed: `RIFF` chunk, a 16-byte `fmt ` chunk with
//! format tag 1, then the `data` chunk header. All integers are
//! little-endian. `block_align` and `byte_rate` are always recomputed from
//! channels, rate and bit depth.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{WavError, WavResult};
use crate::format::{FormatParameters, PCM_FORMAT_TAG};
use crate::payload::AudioPayload;

/// Size of the canonical header in bytes.
pub const HEADER_SIZE: usize = 44;

/// Size of the PCM `fmt ` chunk body.
pub const FMT_CHUNK_SIZE: u32 = 16;

/// Bytes counted by the RIFF size field before the payload
/// (`WAVE` + `fmt ` chunk + `data` chunk header).
const RIFF_OVERHEAD: u64 = 36;

/// Largest payload whose RIFF chunk size still fits in a u32.
pub const MAX_PAYLOAD_SIZE: u64 = u32::MAX as u64 - RIFF_OVERHEAD;

/// Builds the 44-byte header for a payload of `payload_size` bytes.
///
/// # Errors
/// [`WavError::PayloadTooLarge`] if `payload_size > MAX_PAYLOAD_SIZE`.
pub fn build_header(payload_size: u64, params: &FormatParameters) -> WavResult<[u8; HEADER_SIZE]> {
    let data_size = checked_data_size(payload_size)?;
    let mut header = [0u8; HEADER_SIZE];
    write_header(&mut &mut header[..], data_size, params)
        .expect("canonical header fits its 44-byte buffer");
    Ok(header)
}

/// Writes a complete WAV file (header followed by payload) to a writer.
///
/// An oversized payload is reported as an `InvalidInput` I/O error wrapping
/// [`WavError::PayloadTooLarge`].
pub fn write_wav<W: Write>(
    writer: &mut W,
    params: &FormatParameters,
    payload: &[u8],
) -> io::Result<()> {
    let data_size = checked_data_size(payload.len() as u64)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    write_header(writer, data_size, params)?;
    writer.write_all(payload)
}

/// Wraps a payload in a canonical header, returning a new buffer.
pub fn to_wav(payload: &AudioPayload, params: &FormatParameters) -> WavResult<Vec<u8>> {
    let header = build_header(payload.len() as u64, params)?;
    let mut buffer = Vec::with_capacity(HEADER_SIZE + payload.len());
    buffer.extend_from_slice(&header);
    buffer.extend_from_slice(payload.as_bytes());
    Ok(buffer)
}

fn checked_data_size(payload_size: u64) -> WavResult<u32> {
    if payload_size > MAX_PAYLOAD_SIZE {
        return Err(WavError::PayloadTooLarge { size: payload_size });
    }
    Ok(payload_size as u32)
}

fn write_header<W: Write>(writer: &mut W, data_size: u32, params: &FormatParameters) -> io::Result<()> {
    let format = params.normalized();

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(RIFF_OVERHEAD as u32 + data_size)?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(FMT_CHUNK_SIZE)?;
    writer.write_u16::<LittleEndian>(PCM_FORMAT_TAG)?;
    writer.write_u16::<LittleEndian>(format.num_channels)?;
    writer.write_u32::<LittleEndian>(format.sample_rate)?;
    writer.write_u32::<LittleEndian>(format.byte_rate)?;
    writer.write_u16::<LittleEndian>(format.block_align)?;
    writer.write_u16::<LittleEndian>(format.bits_per_sample)?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_size)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_is_bit_exact() {
        let header = build_header(600, &FormatParameters::mono(44100)).unwrap();

        #[rustfmt::skip]
        let expected: [u8; 44] = [
            b'R', b'I', b'F', b'F', 0x7C, 0x02, 0x00, 0x00, // 36 + 600 = 636
            b'W', b'A', b'V', b'E',
            b'f', b'm', b't', b' ', 0x10, 0x00, 0x00, 0x00,
            0x01, 0x00,             // PCM
            0x01, 0x00,             // mono
            0x44, 0xAC, 0x00, 0x00, // 44100
            0x88, 0x58, 0x01, 0x00, // 88200
            0x02, 0x00,             // block align
            0x10, 0x00,             // 16 bits
            b'd', b'a', b't', b'a', 0x58, 0x02, 0x00, 0x00, // 600
        ];
        assert_eq!(header, expected);
    }

    #[test]
    fn test_header_recomputes_derived_fields() {
        let bogus = FormatParameters {
            audio_format: 3,
            num_channels: 2,
            sample_rate: 8000,
            byte_rate: 7,
            block_align: 7,
            bits_per_sample: 8,
        };
        let header = build_header(0, &bogus).unwrap();
        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        assert_eq!(
            u32::from_le_bytes([header[28], header[29], header[30], header[31]]),
            16000
        );
        assert_eq!(u16::from_le_bytes([header[32], header[33]]), 2);
    }

    #[test]
    fn test_max_payload_accepted() {
        let header = build_header(MAX_PAYLOAD_SIZE, &FormatParameters::mono(8000)).unwrap();
        assert_eq!(&header[4..8], &u32::MAX.to_le_bytes());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let err = build_header(MAX_PAYLOAD_SIZE + 1, &FormatParameters::mono(8000)).unwrap_err();
        assert_eq!(
            err,
            WavError::PayloadTooLarge {
                size: MAX_PAYLOAD_SIZE + 1
            }
        );
    }

    #[test]
    fn test_write_wav_matches_to_wav() {
        let format = FormatParameters::stereo(48000);
        let payload = AudioPayload::new(vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mut streamed = Vec::new();
        write_wav(&mut streamed, &format, payload.as_bytes()).unwrap();

        assert_eq!(streamed, to_wav(&payload, &format).unwrap());
        assert_eq!(streamed.len(), HEADER_SIZE + 8);
        assert_eq!(&streamed[HEADER_SIZE..], payload.as_bytes());
    }
}
