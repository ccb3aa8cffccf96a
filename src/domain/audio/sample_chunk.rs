//! Sample chunk value object

use super::converter::{convert_le16, BYTES_PER_SAMPLE};
use crate::domain::error::SampleFormatError;

/// A validated view over interleaved little-endian 16-bit PCM.
///
/// Construction guarantees the byte length is a whole number of frames
/// for the channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleChunk<'a> {
    bytes: &'a [u8],
    channels: u16,
}

impl<'a> SampleChunk<'a> {
    /// Wrap raw PCM bytes, rejecting fractional frames
    pub fn new(bytes: &'a [u8], channels: u16) -> Result<Self, SampleFormatError> {
        if channels == 0 {
            return Err(SampleFormatError::ZeroChannels);
        }
        if bytes.len() % BYTES_PER_SAMPLE != 0 {
            return Err(SampleFormatError::OddLength { len: bytes.len() });
        }
        if bytes.len() % (BYTES_PER_SAMPLE * usize::from(channels)) != 0 {
            return Err(SampleFormatError::PartialFrame {
                len: bytes.len(),
                channels,
            });
        }
        Ok(Self { bytes, channels })
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Get the channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.bytes.len() / (BYTES_PER_SAMPLE * usize::from(self.channels))
    }

    /// Number of individual samples across all channels
    pub fn sample_count(&self) -> usize {
        self.bytes.len() / BYTES_PER_SAMPLE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Convert into a caller-owned native sample buffer
    pub fn convert_into(&self, out: &mut [i32]) -> Result<usize, SampleFormatError> {
        convert_le16(self.bytes, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_frame_count() {
        let bytes = [0u8; 20];
        let chunk = SampleChunk::new(&bytes, 1).unwrap();
        assert_eq!(chunk.frames(), 10);
        assert_eq!(chunk.sample_count(), 10);
    }

    #[test]
    fn stereo_frame_count() {
        let bytes = [0u8; 20];
        let chunk = SampleChunk::new(&bytes, 2).unwrap();
        assert_eq!(chunk.frames(), 5);
        assert_eq!(chunk.sample_count(), 10);
        assert_eq!(chunk.channels(), 2);
    }

    #[test]
    fn partial_frame_rejected() {
        let bytes = [0u8; 6];
        assert_eq!(
            SampleChunk::new(&bytes, 2),
            Err(SampleFormatError::PartialFrame {
                len: 6,
                channels: 2
            })
        );
    }

    #[test]
    fn odd_length_rejected_before_frame_check() {
        let bytes = [0u8; 5];
        assert_eq!(
            SampleChunk::new(&bytes, 2),
            Err(SampleFormatError::OddLength { len: 5 })
        );
    }

    #[test]
    fn zero_channels_rejected() {
        assert_eq!(
            SampleChunk::new(&[0, 0], 0),
            Err(SampleFormatError::ZeroChannels)
        );
    }

    #[test]
    fn empty_chunk_is_valid() {
        let chunk = SampleChunk::new(&[], 2).unwrap();
        assert!(chunk.is_empty());
        assert_eq!(chunk.frames(), 0);
    }

    #[test]
    fn convert_preserves_interleaving() {
        // L=1, R=-1, L=2, R=-2
        let bytes = [0x01, 0x00, 0xFF, 0xFF, 0x02, 0x00, 0xFE, 0xFF];
        let chunk = SampleChunk::new(&bytes, 2).unwrap();
        let mut out = [0i32; 4];
        assert_eq!(chunk.convert_into(&mut out), Ok(4));
        assert_eq!(out, [1, -1, 2, -2]);
    }
}
