//! Push-mode adapter
//!
//! The caller hands over one raw PCM buffer per call and receives the
//! encoded output through its sink before the call returns.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::domain::audio::{AudioMimeType, SampleChunk, StreamParams};
use crate::domain::error::EncoderError;
use crate::domain::session::{InvalidStateTransition, SessionState};

use super::batch::read_block;
use super::ports::{ChunkBuffer, EncodedSink, EncodingEngine, EngineFactory, StreamEncoder};
use super::session::EncodingSession;

/// FLAC encoder driven one caller buffer at a time
pub struct PushEncoder<E: EncodingEngine> {
    session: EncodingSession<E>,
}

impl<E: EncodingEngine> PushEncoder<E> {
    /// Allocate a new engine-backed encoder
    pub fn new<F>(factory: &F) -> Result<Self, EncoderError>
    where
        F: EngineFactory<Engine = E>,
    {
        Ok(Self {
            session: EncodingSession::create(factory)?,
        })
    }

    /// Get the underlying session
    pub fn session(&self) -> &EncodingSession<E> {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Configure the stream and bind the output sink
    pub fn configure(
        &mut self,
        params: StreamParams,
        sink: Box<dyn EncodedSink>,
    ) -> Result<(), EncoderError> {
        self.session.configure(params, sink)
    }

    /// Validate and encode one PCM buffer.
    ///
    /// The buffer must hold whole frames and fit the session capacity;
    /// it is fed in a single step.
    pub fn push(&mut self, pcm: &[u8]) -> Result<(), EncoderError> {
        let channels = match self.session.params() {
            Some(params) => params.channels,
            None => {
                return Err(InvalidStateTransition {
                    current_state: self.session.state(),
                    action: "encode".to_string(),
                }
                .into())
            }
        };
        let chunk = SampleChunk::new(pcm, channels)?;
        self.session.feed(&chunk)
    }

    /// Flush the final frame
    pub fn finish(&mut self) -> Result<(), EncoderError> {
        self.session.finish()
    }

    /// Free the engine; repeated calls are no-ops
    pub fn close(&mut self) {
        self.session.release()
    }
}

impl<E: EncodingEngine> StreamEncoder for PushEncoder<E> {
    fn initialize(
        &mut self,
        params: StreamParams,
        sink: Box<dyn EncodedSink>,
    ) -> Result<(), EncoderError> {
        self.configure(params, sink)
    }

    fn encode(&mut self, pcm: &[u8]) -> Result<(), EncoderError> {
        self.push(pcm)
    }

    fn release(&mut self) -> Result<(), EncoderError> {
        let result = if self.session.state().accepts_input() {
            self.finish()
        } else {
            Ok(())
        };
        if let Err(ref e) = result {
            debug!(error = %e, "finish failed during release");
        }
        self.close();
        result
    }

    fn mime_type(&self) -> AudioMimeType {
        AudioMimeType::Flac
    }
}

/// Totals from one piped stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeStats {
    pub frames: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Push PCM from `reader` through `encoder` into `writer` until end of input.
///
/// Input is read in blocks of `params.buffer_frames` frames and each block
/// is encoded in one call; whatever the encoder produced is written out
/// before the next read. The encoder is released on every path, which
/// flushes the final frame when the stream is still open.
pub fn pipe_stream<R: Read, W: Write>(
    encoder: &mut dyn StreamEncoder,
    params: StreamParams,
    reader: &mut R,
    writer: &mut W,
) -> Result<PipeStats, EncoderError> {
    let out = ChunkBuffer::new();
    let mut stats = PipeStats::default();

    let result = pump(encoder, params, reader, writer, &out, &mut stats);
    let released = encoder.release();
    let drained = drain(&out, writer, &mut stats);

    result?;
    released?;
    drained?;
    writer.flush()?;
    debug!(
        frames = stats.frames,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        mime = %encoder.mime_type(),
        "stream drained"
    );
    Ok(stats)
}

fn pump<R: Read, W: Write>(
    encoder: &mut dyn StreamEncoder,
    params: StreamParams,
    reader: &mut R,
    writer: &mut W,
    out: &ChunkBuffer,
    stats: &mut PipeStats,
) -> Result<(), EncoderError> {
    encoder.initialize(params, Box::new(out.clone()))?;
    drain(out, writer, stats)?;

    let block_len = params.buffer_bytes().ok_or_else(|| {
        EncoderError::ConfigurationRejected("buffer size overflows".to_string())
    })?;
    let mut block = vec![0u8; block_len];
    loop {
        let n = read_block(reader, &mut block).map_err(|e| {
            warn!(error = %e, "input read failed");
            e
        })?;
        if n > 0 {
            encoder.encode(&block[..n])?;
            stats.frames += (n / params.bytes_per_frame()) as u64;
            stats.bytes_in += n as u64;
            drain(out, writer, stats)?;
        }
        if n < block_len {
            return Ok(());
        }
    }
}

fn drain<W: Write>(out: &ChunkBuffer, writer: &mut W, stats: &mut PipeStats) -> Result<(), EncoderError> {
    let bytes = out.take();
    if !bytes.is_empty() {
        writer.write_all(&bytes)?;
        writer.flush()?;
        stats.bytes_out += bytes.len() as u64;
    }
    Ok(())
}
