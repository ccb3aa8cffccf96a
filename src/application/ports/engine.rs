//! Encoding engine port interface
//!
//! The engine is the FLAC compressor itself. Sessions drive it through
//! this trait and never look at its internals.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

/// Callback through which an engine hands out encoded bytes.
/// Parameters: (bytes, samples represented)
///
/// The byte slice is only valid for the duration of the call.
pub type WriteCallback = Box<dyn FnMut(&[u8], u32) -> io::Result<()> + Send>;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine could not be allocated: {0}")]
    Allocation(String),

    #[error("Parameter {name} = {value} is outside the supported range")]
    InvalidParameter { name: &'static str, value: u64 },

    #[error("Engine is already initialized")]
    AlreadyInitialized,

    #[error("Engine is not initialized")]
    Uninitialized,

    #[error("Verification failed: {0}")]
    Verify(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Failed to write encoded output: {0}")]
    Write(#[from] io::Error),
}

/// Failure codes returned by stream initialization
#[derive(Debug, Error)]
pub enum InitError {
    #[error("engine is already initialized")]
    AlreadyInitialized,

    #[error("invalid number of channels")]
    InvalidChannels,

    #[error("invalid bits per sample")]
    InvalidBitsPerSample,

    #[error("invalid sample rate")]
    InvalidSampleRate,

    #[error("invalid block size")]
    InvalidBlockSize,

    #[error("encoder rejected configuration: {0}")]
    Encoder(String),

    #[error("failed to open output: {0}")]
    Io(#[from] io::Error),
}

/// Port for a streaming FLAC encoding engine.
///
/// Setters must be called before one of the `init_*` methods and each
/// rejects values outside the engine's legal range. After init, the engine
/// writes the stream header and then one chunk per encoded frame through
/// the bound output, synchronously from inside `init_*`, `process_interleaved`
/// or `finish`.
pub trait EncodingEngine: Send {
    fn set_verify(&mut self, verify: bool) -> Result<(), EngineError>;

    fn set_compression_level(&mut self, level: u8) -> Result<(), EngineError>;

    fn set_channels(&mut self, channels: u16) -> Result<(), EngineError>;

    fn set_bits_per_sample(&mut self, bits: u8) -> Result<(), EngineError>;

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), EngineError>;

    /// Optional hint; engines may ignore it
    fn set_total_samples_estimate(&mut self, samples: u64) -> Result<(), EngineError>;

    /// Initialize for streaming output through `write`
    fn init_stream(&mut self, write: WriteCallback) -> Result<(), InitError>;

    /// Initialize for output written straight to a file at `path`
    fn init_file(&mut self, path: &Path) -> Result<(), InitError> {
        let mut file = File::create(path)?;
        self.init_stream(Box::new(move |bytes: &[u8], _samples: u32| file.write_all(bytes)))
    }

    /// Encode `frames` interleaved frames from `samples`
    fn process_interleaved(&mut self, samples: &[i32], frames: usize) -> Result<(), EngineError>;

    /// Flush buffered samples as a final frame
    fn finish(&mut self) -> Result<(), EngineError>;
}

/// Port for constructing engines
pub trait EngineFactory {
    type Engine: EncodingEngine;

    /// Allocate a fresh, unconfigured engine
    fn allocate(&self) -> Result<Self::Engine, EngineError>;
}
