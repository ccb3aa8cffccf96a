//! flac-bridge - streaming PCM to FLAC encoding bridge
//!
//! Accepts chunks of 16-bit little-endian PCM, converts them to the
//! encoder's native interleaved 32-bit samples and hands the compressed
//! FLAC bytes back to the caller as soon as the engine produces them. The
//! whole encoded file is never held in memory.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Sample conversion, chunk and parameter value objects,
//!   session lifecycle, errors
//! - **Application**: Encoding session, push and batch adapters, handle
//!   registry, and the engine/sink/config port traits
//! - **Infrastructure**: `flacenc` engine, WAV pass-through, XDG config store
//! - **CLI**: Argument parsing, presenter, logging, command runners
//!
//! # Example
//!
//! ```no_run
//! use flac_bridge::application::{ports::ChunkBuffer, PushEncoder};
//! use flac_bridge::domain::audio::StreamParams;
//! use flac_bridge::infrastructure::FlacencEngineFactory;
//!
//! # fn main() -> Result<(), flac_bridge::domain::EncoderError> {
//! let out = ChunkBuffer::new();
//! let mut encoder = PushEncoder::new(&FlacencEngineFactory)?;
//! encoder.configure(StreamParams::new(16000, 1), Box::new(out.clone()))?;
//! encoder.push(&[0u8; 2048])?;
//! encoder.finish()?;
//! encoder.close();
//! let flac = out.take();
//! # let _ = flac;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
