//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces: the
//! `flacenc`-backed encoding engine, the WAV pass-through encoder and the
//! XDG config store.

pub mod config;
pub mod engine;
pub mod wav;

// Re-export adapters
pub use config::XdgConfigStore;
pub use engine::{convert_raw_pcm, FlacencEngine, FlacencEngineFactory};
pub use wav::WavEncoder;
