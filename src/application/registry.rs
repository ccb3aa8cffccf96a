//! Handle-based session registry
//!
//! Callers that cannot hold a session value directly (FFI-style or
//! long-lived service callers) refer to encoders by an opaque handle.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::domain::audio::StreamParams;
use crate::domain::error::EncoderError;
use crate::domain::session::SessionState;

use super::ports::{EncodedSink, EngineFactory};
use super::push::PushEncoder;

/// Opaque session identifier. Zero is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns every open push encoder, keyed by handle
pub struct SessionRegistry<F: EngineFactory> {
    factory: F,
    sessions: HashMap<SessionHandle, PushEncoder<F::Engine>>,
    next_id: u64,
}

impl<F: EngineFactory> SessionRegistry<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate an engine and register a new session for it
    pub fn open(&mut self) -> Result<SessionHandle, EncoderError> {
        let encoder = PushEncoder::new(&self.factory)?;
        let handle = SessionHandle(self.next_id);
        self.next_id += 1;
        self.sessions.insert(handle, encoder);
        debug!(%handle, "session opened");
        Ok(handle)
    }

    pub fn configure(
        &mut self,
        handle: SessionHandle,
        params: StreamParams,
        sink: Box<dyn EncodedSink>,
    ) -> Result<(), EncoderError> {
        self.get_mut(handle)?.configure(params, sink)
    }

    pub fn encode(&mut self, handle: SessionHandle, pcm: &[u8]) -> Result<(), EncoderError> {
        self.get_mut(handle)?.push(pcm)
    }

    pub fn finish(&mut self, handle: SessionHandle) -> Result<(), EncoderError> {
        self.get_mut(handle)?.finish()
    }

    /// Release and forget a session.
    ///
    /// Returns false for unknown or already released handles.
    pub fn release(&mut self, handle: SessionHandle) -> bool {
        match self.sessions.remove(&handle) {
            Some(mut encoder) => {
                encoder.close();
                debug!(%handle, "session released");
                true
            }
            None => false,
        }
    }

    pub fn state(&self, handle: SessionHandle) -> Option<SessionState> {
        self.sessions.get(&handle).map(PushEncoder::state)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get_mut(&mut self, handle: SessionHandle) -> Result<&mut PushEncoder<F::Engine>, EncoderError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(EncoderError::UnknownSession(handle.0))
    }
}
