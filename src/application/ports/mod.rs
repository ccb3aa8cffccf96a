//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod engine;
pub mod sink;
pub mod stream_encoder;

// Re-export common types
pub use config::ConfigStore;
pub use engine::{EncodingEngine, EngineError, EngineFactory, InitError, WriteCallback};
pub use sink::{ChunkBuffer, EncodedSink};
pub use stream_encoder::StreamEncoder;
