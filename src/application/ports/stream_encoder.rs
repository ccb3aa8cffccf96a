//! Stream encoder port interface

use crate::domain::audio::{AudioMimeType, StreamParams};
use crate::domain::error::EncoderError;

use super::sink::EncodedSink;

/// Port for an output format that turns pushed PCM into a byte stream
pub trait StreamEncoder: Send {
    /// Prepare the encoder and bind its output.
    ///
    /// # Arguments
    /// * `params` - Stream parameters of the incoming PCM
    /// * `sink` - Receives encoded bytes as they are produced
    fn initialize(
        &mut self,
        params: StreamParams,
        sink: Box<dyn EncodedSink>,
    ) -> Result<(), EncoderError>;

    /// Encode one buffer of interleaved little-endian 16-bit PCM
    fn encode(&mut self, pcm: &[u8]) -> Result<(), EncoderError>;

    /// Finalize the stream if still open, then free all resources.
    /// Safe to call more than once.
    fn release(&mut self) -> Result<(), EncoderError>;

    /// MIME type of the produced stream
    fn mime_type(&self) -> AudioMimeType;

    /// File extension of the produced stream
    fn extension(&self) -> &'static str {
        self.mime_type().extension()
    }
}
