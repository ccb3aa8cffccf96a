//! Encoded chunk value object

/// A run of compressed bytes handed out by the engine.
///
/// Borrows the engine's buffer, so it cannot outlive the callback that
/// receives it. Sinks that need the bytes later must copy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedChunk<'a> {
    bytes: &'a [u8],
    samples: u32,
}

impl<'a> EncodedChunk<'a> {
    pub fn new(bytes: &'a [u8], samples: u32) -> Self {
        Self { bytes, samples }
    }

    /// Get the compressed bytes
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of frames (per-channel samples) this chunk encodes.
    /// Zero for stream metadata such as the header.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}
