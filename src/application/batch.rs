//! Batch file conversion use case
//!
//! Reads raw PCM from a file or reader in fixed-size blocks until a short
//! read, feeds every block to a session configured for file output and
//! finishes the stream exactly once.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::audio::{SampleChunk, StreamParams};
use crate::domain::error::EncoderError;

use super::ports::EngineFactory;
use super::session::EncodingSession;

/// Progress callback receiving (frames_done, total_frames)
pub type ProgressCallback = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Summary of a finished conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub frames: u64,
    pub blocks: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u8,
    pub compression_level: u8,
}

impl ConversionReport {
    /// Duration of the encoded audio in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    /// Output size relative to input size
    pub fn ratio(&self) -> Option<f64> {
        (self.input_bytes > 0).then(|| self.output_bytes as f64 / self.input_bytes as f64)
    }
}

/// Converts raw PCM files to FLAC files
pub struct BatchConverter<F: EngineFactory> {
    factory: F,
    on_progress: Option<ProgressCallback>,
}

impl<F: EngineFactory> BatchConverter<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            on_progress: None,
        }
    }

    /// Report progress after every encoded block
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Encode the raw PCM file at `input` into a FLAC file at `output`.
    ///
    /// The input is opened before any engine is allocated. If the output
    /// file was created and the conversion fails, it is removed.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        params: StreamParams,
    ) -> Result<ConversionReport, EncoderError> {
        let file = File::open(input).map_err(|e| {
            warn!(input = %input.display(), error = %e, "cannot open input");
            e
        })?;
        let input_len = file.metadata()?.len();
        let bytes_per_frame = params.bytes_per_frame() as u64;
        let params = if bytes_per_frame > 0 && params.total_samples_estimate.is_none() {
            params.with_total_samples_estimate(input_len / bytes_per_frame)
        } else {
            params
        };

        let mut report = self.convert_reader(file, output, params)?;
        report.input = Some(input.to_path_buf());
        Ok(report)
    }

    /// Encode raw PCM from any reader into a FLAC file at `output`
    pub fn convert_reader<R: Read>(
        &self,
        mut reader: R,
        output: &Path,
        params: StreamParams,
    ) -> Result<ConversionReport, EncoderError> {
        let mut session = EncodingSession::create(&self.factory)?;
        if let Err(e) = session.configure_file(params, output) {
            session.release();
            return Err(e);
        }

        let result = self.encode_blocks(&mut session, &mut reader, &params);
        session.release();

        let (frames, blocks, input_bytes) = match result {
            Ok(counts) => counts,
            Err(e) => {
                remove_partial_output(output);
                return Err(e);
            }
        };

        let output_bytes = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        info!(
            output = %output.display(),
            frames,
            blocks,
            output_bytes,
            "conversion complete"
        );
        Ok(ConversionReport {
            input: None,
            output: output.to_path_buf(),
            frames,
            blocks,
            input_bytes,
            output_bytes,
            sample_rate: params.sample_rate,
            channels: params.channels,
            bits_per_sample: params.bits_per_sample,
            compression_level: params.compression_level,
        })
    }

    /// Returns (frames, blocks, bytes read)
    fn encode_blocks<R: Read>(
        &self,
        session: &mut EncodingSession<F::Engine>,
        reader: &mut R,
        params: &StreamParams,
    ) -> Result<(u64, u64, u64), EncoderError> {
        let block_len = params.buffer_bytes().ok_or_else(|| {
            EncoderError::ConfigurationRejected("buffer size overflows".to_string())
        })?;
        let mut block = vec![0u8; block_len];
        let total = params.total_samples_estimate;
        let mut frames = 0u64;
        let mut blocks = 0u64;
        let mut bytes = 0u64;

        loop {
            let n = read_block(reader, &mut block).map_err(|e| {
                warn!(error = %e, "input read failed");
                e
            })?;
            if n > 0 {
                let chunk = SampleChunk::new(&block[..n], params.channels)?;
                session.feed(&chunk)?;
                frames += chunk.frames() as u64;
                blocks += 1;
                bytes += n as u64;
                if let Some(ref cb) = self.on_progress {
                    cb(frames, total);
                }
            }
            if n < block_len {
                break;
            }
        }

        debug!(frames, blocks, "input drained");
        session.finish()?;
        Ok((frames, blocks, bytes))
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input
pub(crate) fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn remove_partial_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => debug!(output = %output.display(), "removed partial output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(output = %output.display(), error = %e, "failed to remove partial output"),
    }
}
