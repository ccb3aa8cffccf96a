//! FLAC encoding engine adapters

mod flacenc_engine;

use std::path::Path;

pub use flacenc_engine::{
    block_size_for_level, FlacencEngine, FlacencEngineFactory, MAX_BITS_PER_SAMPLE,
    MAX_BLOCK_SIZE, MAX_CHANNELS, MAX_COMPRESSION_LEVEL, MAX_SAMPLE_RATE, MIN_BITS_PER_SAMPLE,
    MIN_BLOCK_SIZE, MIN_SAMPLE_RATE,
};

use crate::application::{BatchConverter, ConversionReport};
use crate::domain::audio::{StreamParams, DEFAULT_BUFFER_FRAMES};
use crate::domain::error::EncoderError;

/// Encode a raw PCM file into a FLAC file in one call
pub fn convert_raw_pcm(
    input: &Path,
    output: &Path,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u8,
    compression_level: u8,
) -> Result<ConversionReport, EncoderError> {
    let params = StreamParams::new(sample_rate, channels)
        .with_bits_per_sample(bits_per_sample)
        .with_compression_level(compression_level)
        .with_buffer_frames(DEFAULT_BUFFER_FRAMES);
    BatchConverter::new(FlacencEngineFactory).convert(input, output, params)
}
