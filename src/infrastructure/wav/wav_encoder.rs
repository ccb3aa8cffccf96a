//! Pass-through WAV stream encoder
//!
//! Emits a RIFF/WAVE header followed by the PCM exactly as received. The
//! size fields are left at zero since a live stream's length is unknown
//! when the header goes out.

use tracing::debug;

use crate::application::ports::{EncodedSink, StreamEncoder};
use crate::domain::audio::{AudioMimeType, EncodedChunk, SampleChunk, StreamParams, BYTES_PER_SAMPLE};
use crate::domain::error::EncoderError;
use crate::domain::session::{InvalidStateTransition, SessionLifecycle, SessionState};

pub const WAV_HEADER_LEN: usize = 44;

const WAVE_FORMAT_PCM: u16 = 1;

/// Canonical 44-byte header for 16-bit PCM with unknown length.
///
/// `None` when the block align or byte rate does not fit its header field.
pub fn wav_header(sample_rate: u32, channels: u16) -> Option<[u8; WAV_HEADER_LEN]> {
    let bits = (BYTES_PER_SAMPLE * 8) as u16;
    let block_align = channels.checked_mul(BYTES_PER_SAMPLE as u16)?;
    let byte_rate = sample_rate.checked_mul(u32::from(block_align))?;

    let mut header = [0u8; WAV_HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bits.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    Some(header)
}

/// Stream encoder that wraps raw PCM in a WAV container
#[derive(Default)]
pub struct WavEncoder {
    lifecycle: SessionLifecycle,
    params: Option<StreamParams>,
    sink: Option<Box<dyn EncodedSink>>,
}

impl WavEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }
}

impl StreamEncoder for WavEncoder {
    fn initialize(
        &mut self,
        params: StreamParams,
        mut sink: Box<dyn EncodedSink>,
    ) -> Result<(), EncoderError> {
        self.lifecycle.check_configure()?;
        params
            .validate()
            .map_err(EncoderError::ConfigurationRejected)?;
        if params.bits_per_sample != 16 {
            return Err(EncoderError::ConfigurationRejected(format!(
                "WAV pass-through carries 16-bit PCM, not {}-bit",
                params.bits_per_sample
            )));
        }

        let header = wav_header(params.sample_rate, params.channels).ok_or_else(|| {
            EncoderError::ConfigurationRejected(format!(
                "{} channels at {} Hz do not fit a WAV header",
                params.channels, params.sample_rate
            ))
        })?;
        sink.on_encoded_chunk(EncodedChunk::new(&header, 0));
        self.sink = Some(sink);
        self.params = Some(params);
        self.lifecycle.configure()?;
        debug!(sample_rate = params.sample_rate, channels = params.channels, "wav stream initialized");
        Ok(())
    }

    fn encode(&mut self, pcm: &[u8]) -> Result<(), EncoderError> {
        let (params, sink) = match (self.params, self.sink.as_mut()) {
            (Some(params), Some(sink)) if self.lifecycle.state().accepts_input() => (params, sink),
            _ => {
                return Err(InvalidStateTransition {
                    current_state: self.lifecycle.state(),
                    action: "encode".to_string(),
                }
                .into())
            }
        };
        let chunk = SampleChunk::new(pcm, params.channels)?;
        self.lifecycle.feed()?;
        sink.on_encoded_chunk(EncodedChunk::new(chunk.as_bytes(), chunk.frames() as u32));
        Ok(())
    }

    fn release(&mut self) -> Result<(), EncoderError> {
        if self.lifecycle.state().accepts_input() {
            self.lifecycle.finish()?;
        }
        if self.lifecycle.release() {
            self.sink = None;
            debug!("wav stream released");
        }
        Ok(())
    }

    fn mime_type(&self) -> AudioMimeType {
        AudioMimeType::Wav
    }
}
