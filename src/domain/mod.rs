//! Domain layer - Core encoding model
//!
//! Contains value objects, the session state machine, and domain errors.
//! This layer has no dependencies on the encoding engine or the filesystem.

pub mod audio;
pub mod config;
pub mod error;
pub mod session;

// Re-export common types
pub use audio::{
    convert_le16, AudioMimeType, EncodedChunk, SampleChunk, StreamParams, BYTES_PER_SAMPLE,
};
pub use config::AppConfig;
pub use error::*;
pub use session::{InvalidStateTransition, SessionLifecycle, SessionState};
