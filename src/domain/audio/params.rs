//! Stream parameters value object

use serde::{Deserialize, Serialize};

use super::converter::BYTES_PER_SAMPLE;

/// Default compression level (engine range is 0..=8)
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 5;

/// Default bit depth of the input PCM
pub const DEFAULT_BITS_PER_SAMPLE: u8 = 16;

/// Default per-session native buffer capacity in frames
pub const DEFAULT_BUFFER_FRAMES: usize = 1024;

/// Largest per-session buffer capacity in frames
pub const MAX_BUFFER_FRAMES: usize = 65_535;

/// Parameters for one encoded stream.
///
/// Immutable once handed to a session. Verify-on-encode is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
    /// Bits per sample written to the stream
    pub bits_per_sample: u8,
    /// Engine compression level
    pub compression_level: u8,
    /// Maximum frames accepted by a single feed
    pub buffer_frames: usize,
    /// Optional hint of the total frame count; has no effect on correctness
    pub total_samples_estimate: Option<u64>,
}

impl StreamParams {
    /// Create parameters with default bit depth, level and buffer size
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            total_samples_estimate: None,
        }
    }

    pub const fn with_bits_per_sample(mut self, bits: u8) -> Self {
        self.bits_per_sample = bits;
        self
    }

    pub const fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    pub const fn with_buffer_frames(mut self, frames: usize) -> Self {
        self.buffer_frames = frames;
        self
    }

    pub const fn with_total_samples_estimate(mut self, samples: u64) -> Self {
        self.total_samples_estimate = Some(samples);
        self
    }

    /// Verify-on-encode is never disabled
    pub const fn verify(&self) -> bool {
        true
    }

    /// Size in bytes of one interleaved 16-bit input frame
    pub const fn bytes_per_frame(&self) -> usize {
        BYTES_PER_SAMPLE * self.channels as usize
    }

    /// Number of native samples the per-session buffer must hold
    pub const fn buffer_samples(&self) -> Option<usize> {
        self.buffer_frames.checked_mul(self.channels as usize)
    }

    /// Size in bytes of one full buffer of 16-bit input
    pub const fn buffer_bytes(&self) -> Option<usize> {
        self.buffer_frames.checked_mul(self.bytes_per_frame())
    }

    /// Check the engine-independent invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be greater than 0".to_string());
        }
        if self.channels == 0 {
            return Err("channel count must be at least 1".to_string());
        }
        if self.buffer_frames == 0 {
            return Err("buffer capacity must be at least 1 frame".to_string());
        }
        if self.buffer_frames > MAX_BUFFER_FRAMES {
            return Err(format!(
                "buffer capacity of {} frames exceeds the maximum of {}",
                self.buffer_frames, MAX_BUFFER_FRAMES
            ));
        }
        if self.buffer_samples().is_none() || self.buffer_bytes().is_none() {
            return Err("buffer size overflows".to_string());
        }
        Ok(())
    }
}
