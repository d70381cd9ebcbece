//! Raw PCM payloads.

/// An immutable, owned sequence of raw PCM sample bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioPayload {
    bytes: Vec<u8>,
}

impl AudioPayload {
    /// Wraps raw PCM bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copies a PCM slice into a new payload.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the payload and returns the underlying bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    /// Whether the payload holds a whole number of `block_align`-sized frames.
    ///
    /// A zero `block_align` cannot describe any frame, so only an empty
    /// payload is aligned to it.
    pub fn is_frame_aligned(&self, block_align: u16) -> bool {
        if block_align == 0 {
            return self.bytes.is_empty();
        }
        self.bytes.len() % block_align as usize == 0
    }

    /// BLAKE3 hash of the PCM bytes, as lowercase hex.
    pub fn pcm_hash(&self) -> String {
        blake3::hash(&self.bytes).to_hex().to_string()
    }
}

impl From<Vec<u8>> for AudioPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for AudioPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
