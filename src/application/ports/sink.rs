//! Encoded output sink port

use std::sync::{Arc, Mutex as StdMutex};

use crate::domain::audio::EncodedChunk;

/// Port for receiving encoded chunks as the engine produces them.
///
/// Called on the same thread and stack as `feed`/`finish`, in production
/// order, never after the session is released. Implementations must not
/// call back into the session that owns them.
pub trait EncodedSink: Send {
    fn on_encoded_chunk(&mut self, chunk: EncodedChunk<'_>);
}

impl<F> EncodedSink for F
where
    F: FnMut(&[u8], u32) + Send,
{
    fn on_encoded_chunk(&mut self, chunk: EncodedChunk<'_>) {
        self(chunk.bytes(), chunk.samples())
    }
}

/// Shared byte buffer usable as a sink.
///
/// Clones share the same storage, so the caller keeps one handle and
/// drains what the session appended after each call.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffer {
    inner: Arc<StdMutex<ChunkBufferState>>,
}

#[derive(Debug, Default)]
struct ChunkBufferState {
    bytes: Vec<u8>,
    chunks: usize,
    samples: u64,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the bytes received so far
    pub fn take(&self) -> Vec<u8> {
        match self.inner.lock() {
            Ok(mut state) => std::mem::take(&mut state.bytes),
            Err(poisoned) => std::mem::take(&mut poisoned.into_inner().bytes),
        }
    }

    /// Number of chunks received since creation
    pub fn chunk_count(&self) -> usize {
        self.with_state(|s| s.chunks)
    }

    /// Number of frames represented by the received chunks
    pub fn sample_count(&self) -> u64 {
        self.with_state(|s| s.samples)
    }

    /// Bytes waiting to be taken
    pub fn pending_len(&self) -> usize {
        self.with_state(|s| s.bytes.len())
    }

    fn with_state<T>(&self, f: impl FnOnce(&ChunkBufferState) -> T) -> T {
        match self.inner.lock() {
            Ok(state) => f(&state),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }
}

impl EncodedSink for ChunkBuffer {
    fn on_encoded_chunk(&mut self, chunk: EncodedChunk<'_>) {
        let mut state = match self.inner.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.bytes.extend_from_slice(chunk.bytes());
        state.chunks += 1;
        state.samples += u64::from(chunk.samples());
    }
}
