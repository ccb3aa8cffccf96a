//! Encoding session use case
//!
//! Owns one engine instance and drives it through
//! `create -> configure -> feed* -> finish -> release`. Engine output is
//! forwarded to the caller's sink synchronously, inside the call that
//! produced it.

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::domain::audio::{EncodedChunk, SampleChunk, StreamParams};
use crate::domain::error::{EncoderError, SampleFormatError};
use crate::domain::session::{InvalidStateTransition, SessionLifecycle, SessionState};

use super::ports::{EncodedSink, EncodingEngine, EngineError, EngineFactory, InitError};

/// One live encode bound to an exclusively owned engine
pub struct EncodingSession<E: EncodingEngine> {
    /// `None` once released
    engine: Option<E>,
    lifecycle: SessionLifecycle,
    params: Option<StreamParams>,
    /// Native sample buffer, sized at configure time
    buffer: Vec<i32>,
    failed: bool,
    frames_fed: u64,
}

impl<E: EncodingEngine> EncodingSession<E> {
    /// Allocate an engine and return a session in the created state
    pub fn create<F>(factory: &F) -> Result<Self, EncoderError>
    where
        F: EngineFactory<Engine = E>,
    {
        let engine = factory.allocate().map_err(|e| {
            warn!(error = %e, "engine allocation failed");
            EncoderError::Allocation(e.to_string())
        })?;
        debug!("encoding engine allocated");
        Ok(Self::with_engine(engine))
    }

    /// Wrap an already allocated engine
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine: Some(engine),
            lifecycle: SessionLifecycle::new(),
            params: None,
            buffer: Vec::new(),
            failed: false,
            frames_fed: 0,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Parameters applied by a successful configure
    pub fn params(&self) -> Option<&StreamParams> {
        self.params.as_ref()
    }

    /// Maximum frames a single feed accepts (0 before configure)
    pub fn capacity_frames(&self) -> usize {
        self.params.map(|p| p.buffer_frames).unwrap_or(0)
    }

    /// Total frames handed to the engine so far
    pub fn frames_fed(&self) -> u64 {
        self.frames_fed
    }

    /// Whether an earlier feed or finish failed
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Apply parameters and initialize the engine for streaming output.
    ///
    /// Every encoded chunk is delivered to `sink`. On failure the session
    /// stays in the created state and may be configured again.
    pub fn configure(
        &mut self,
        params: StreamParams,
        mut sink: Box<dyn EncodedSink>,
    ) -> Result<(), EncoderError> {
        self.configure_with(params, move |engine| {
            engine.init_stream(Box::new(move |bytes: &[u8], samples: u32| {
                sink.on_encoded_chunk(EncodedChunk::new(bytes, samples));
                Ok(())
            }))
        })
    }

    /// Apply parameters and initialize the engine to write a file at `path`
    pub fn configure_file(&mut self, params: StreamParams, path: &Path) -> Result<(), EncoderError> {
        self.configure_with(params, |engine| engine.init_file(path))
    }

    fn configure_with(
        &mut self,
        params: StreamParams,
        init: impl FnOnce(&mut E) -> Result<(), InitError>,
    ) -> Result<(), EncoderError> {
        self.lifecycle.check_configure()?;
        params
            .validate()
            .map_err(EncoderError::ConfigurationRejected)?;

        let buffer = allocate_buffer(&params)?;

        let engine = engine_of(&mut self.engine, self.lifecycle.state(), "configure")?;
        if let Err(e) = apply_params(engine, &params) {
            warn!(error = %e, "engine rejected stream parameters");
            return Err(EncoderError::ConfigurationRejected(e.to_string()));
        }
        if let Err(e) = init(engine) {
            warn!(error = %e, "engine initialization failed");
            return Err(match e {
                InitError::Io(e) => EncoderError::Io(e),
                e => EncoderError::ConfigurationRejected(format!(
                    "stream initialization failed: {}",
                    e
                )),
            });
        }

        self.buffer = buffer;
        self.params = Some(params);
        self.lifecycle.configure()?;
        debug!(
            sample_rate = params.sample_rate,
            channels = params.channels,
            bits_per_sample = params.bits_per_sample,
            compression_level = params.compression_level,
            buffer_frames = params.buffer_frames,
            "encoding session configured"
        );
        Ok(())
    }

    /// Convert one chunk into the session buffer and hand it to the engine.
    ///
    /// The chunk must fit the buffer capacity; nothing is split here.
    pub fn feed(&mut self, chunk: &SampleChunk<'_>) -> Result<(), EncoderError> {
        let params = match (self.lifecycle.state().accepts_input(), self.params) {
            (true, Some(params)) => params,
            _ => return Err(self.invalid("feed").into()),
        };
        if self.failed {
            return Err(EncoderError::EncodeRejected(
                "session failed earlier; finish or release it".to_string(),
            ));
        }
        if chunk.channels() != params.channels {
            return Err(SampleFormatError::ChannelMismatch {
                expected: params.channels,
                actual: chunk.channels(),
            }
            .into());
        }
        let frames = chunk.frames();
        if frames > params.buffer_frames {
            return Err(EncoderError::CapacityExceeded {
                frames,
                capacity: params.buffer_frames,
            });
        }

        self.lifecycle.feed()?;
        let written = chunk.convert_into(&mut self.buffer)?;

        let engine = engine_of(&mut self.engine, self.lifecycle.state(), "feed")?;
        let result = engine.process_interleaved(&self.buffer[..written], frames);
        if let Err(e) = result {
            self.failed = true;
            warn!(error = %e, frames, "engine rejected chunk");
            return Err(map_engine_error(e));
        }

        self.frames_fed += frames as u64;
        trace!(frames, total = self.frames_fed, "chunk encoded");
        Ok(())
    }

    /// Flush any partial frame through the engine and close the stream
    pub fn finish(&mut self) -> Result<(), EncoderError> {
        self.lifecycle.finish()?;

        let engine = engine_of(&mut self.engine, self.lifecycle.state(), "finish")?;
        if let Err(e) = engine.finish() {
            self.failed = true;
            warn!(error = %e, "engine failed to finish stream");
            return Err(map_engine_error(e));
        }
        debug!(frames = self.frames_fed, "encoding session finished");
        Ok(())
    }

    /// Free the engine. Safe from any state and safe to repeat.
    pub fn release(&mut self) {
        let previous = self.lifecycle.state();
        if !self.lifecycle.release() {
            debug!("encoding session already released");
            return;
        }
        if previous != SessionState::Finished {
            debug!(state = %previous, "releasing unfinished encoding session");
        }
        self.engine = None;
        self.buffer = Vec::new();
        debug!("encoding session released");
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.lifecycle.state(),
            action: action.to_string(),
        }
    }
}

fn engine_of<'a, E>(
    engine: &'a mut Option<E>,
    state: SessionState,
    action: &str,
) -> Result<&'a mut E, InvalidStateTransition> {
    engine.as_mut().ok_or_else(|| InvalidStateTransition {
        current_state: state,
        action: action.to_string(),
    })
}

/// Zeroed native buffer for one full feed, without aborting on huge sizes
fn allocate_buffer(params: &StreamParams) -> Result<Vec<i32>, EncoderError> {
    let samples = params.buffer_samples().ok_or_else(|| {
        EncoderError::ConfigurationRejected("buffer size overflows".to_string())
    })?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(samples).map_err(|e| {
        warn!(error = %e, samples, "session buffer allocation failed");
        EncoderError::Allocation(e.to_string())
    })?;
    buffer.resize(samples, 0);
    Ok(buffer)
}

fn apply_params<E: EncodingEngine>(engine: &mut E, params: &StreamParams) -> Result<(), EngineError> {
    engine.set_verify(params.verify())?;
    engine.set_compression_level(params.compression_level)?;
    engine.set_channels(params.channels)?;
    engine.set_bits_per_sample(params.bits_per_sample)?;
    engine.set_sample_rate(params.sample_rate)?;
    if let Some(estimate) = params.total_samples_estimate {
        engine.set_total_samples_estimate(estimate)?;
    }
    Ok(())
}

fn map_engine_error(err: EngineError) -> EncoderError {
    match err {
        EngineError::Write(io) => EncoderError::Io(io),
        other => EncoderError::EncodeRejected(other.to_string()),
    }
}
