//! Uncompressed WAV output

mod wav_encoder;

pub use wav_encoder::{wav_header, WavEncoder, WAV_HEADER_LEN};
