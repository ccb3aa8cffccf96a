//! Application layer - Use cases and port interfaces
//!
//! Contains the encoding session and the adapters built on it, plus the
//! trait definitions for the encoding engine and other external systems.

pub mod batch;
pub mod ports;
pub mod push;
pub mod registry;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export use cases
pub use batch::{BatchConverter, ConversionReport, ProgressCallback};
pub use push::{pipe_stream, PipeStats, PushEncoder};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::EncodingSession;
