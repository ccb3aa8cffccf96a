//! Domain error types

use thiserror::Error;

use super::session::InvalidStateTransition;

/// Error when raw PCM bytes cannot be interpreted as 16-bit interleaved frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleFormatError {
    #[error("PCM buffer has odd length {len}; 16-bit samples need an even byte count")]
    OddLength { len: usize },

    #[error("PCM buffer of {len} bytes is not a whole number of {channels}-channel frames")]
    PartialFrame { len: usize, channels: u16 },

    #[error("Channel count must be at least 1")]
    ZeroChannels,

    #[error("Chunk has {actual} channels but the stream was configured for {expected}")]
    ChannelMismatch { expected: u16, actual: u16 },

    #[error("Sample buffer too small: need {needed} samples, have room for {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Errors surfaced by encoding sessions and the adapters built on them
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("Failed to allocate encoding engine: {0}")]
    Allocation(String),

    #[error("Encoder configuration rejected: {0}")]
    ConfigurationRejected(String),

    #[error("Malformed PCM input: {0}")]
    MalformedInput(#[from] SampleFormatError),

    #[error("Encoding rejected: {0}")]
    EncodeRejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Chunk of {frames} frames exceeds session buffer capacity of {capacity} frames")]
    CapacityExceeded { frames: usize, capacity: usize },

    #[error("Unknown session handle: {0}")]
    UnknownSession(u64),
}

impl EncoderError {
    /// Whether the session that produced this error can keep accepting input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput(_)
                | Self::CapacityExceeded { .. }
                | Self::InvalidState(_)
                | Self::UnknownSession(_)
        )
    }
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
