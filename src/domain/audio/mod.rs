//! Audio domain module

mod converter;
mod encoded_chunk;
mod mime;
mod params;
mod sample_chunk;

pub use converter::{convert_le16, BYTES_PER_SAMPLE};
pub use encoded_chunk::EncodedChunk;
pub use mime::AudioMimeType;
pub use params::{
    StreamParams, DEFAULT_BITS_PER_SAMPLE, DEFAULT_BUFFER_FRAMES, DEFAULT_COMPRESSION_LEVEL,
    MAX_BUFFER_FRAMES,
};
pub use sample_chunk::SampleChunk;
