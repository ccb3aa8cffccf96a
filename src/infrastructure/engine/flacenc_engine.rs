//! FLAC engine backed by the pure-Rust `flacenc` crate
//!
//! Samples are collected until a full block is available, then encoded as
//! one fixed-size frame and written out immediately. The remainder is
//! flushed as a shorter final frame on finish.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use flacenc::bitsink::ByteSink;
use flacenc::component::{BitRepr, Stream, StreamInfo};
use flacenc::config;
use flacenc::error::{Verified, Verify};
use flacenc::source::{Fill, FrameBuf};
use tracing::{debug, trace};

use crate::application::ports::{
    EncodingEngine, EngineError, EngineFactory, InitError, WriteCallback,
};
use crate::domain::audio::{DEFAULT_BITS_PER_SAMPLE, DEFAULT_COMPRESSION_LEVEL};
use crate::domain::config::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};

pub const MIN_SAMPLE_RATE: u32 = 1;
pub const MAX_SAMPLE_RATE: u32 = 655_350;
pub const MAX_CHANNELS: u16 = 8;
pub const MIN_BITS_PER_SAMPLE: u8 = 8;
pub const MAX_BITS_PER_SAMPLE: u8 = 24;
pub const MAX_COMPRESSION_LEVEL: u8 = 8;
pub const MIN_BLOCK_SIZE: usize = 16;
pub const MAX_BLOCK_SIZE: usize = 65_535;

/// Engine block size for a compression level.
///
/// `flacenc` has no level presets; the level picks the block length the
/// way the reference encoder's presets do.
pub const fn block_size_for_level(level: u8) -> usize {
    if level <= 2 {
        1152
    } else {
        4096
    }
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    verify: bool,
    compression_level: u8,
    channels: u16,
    bits_per_sample: u8,
    sample_rate: u32,
    total_samples: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verify: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            channels: DEFAULT_CHANNELS,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            total_samples: None,
        }
    }
}

/// Everything needed to encode, built before any output is opened
struct Prepared {
    cfg: Verified<config::Encoder>,
    stream: Stream,
    frame_buf: FrameBuf,
    block_size: usize,
    header: Vec<u8>,
}

struct ActiveStream {
    cfg: Verified<config::Encoder>,
    stream: Stream,
    frame_buf: FrameBuf,
    block_size: usize,
    channels: usize,
    /// Interleaved samples not yet forming a whole block
    pending: Vec<i32>,
    frame_number: usize,
    write: WriteCallback,
}

impl ActiveStream {
    fn encode_full_blocks(&mut self) -> Result<(), EngineError> {
        let block_len = self.block_size * self.channels;
        let mut offset = 0;
        while self.pending.len() - offset >= block_len {
            self.frame_buf
                .fill_interleaved(&self.pending[offset..offset + block_len])
                .map_err(|e| EngineError::Encode(format!("{:?}", e)))?;
            let bytes = self.encode_frame(None)?;
            (self.write)(&bytes, self.block_size as u32)?;
            offset += block_len;
        }
        self.pending.drain(..offset);
        Ok(())
    }

    fn encode_tail(&mut self) -> Result<(), EngineError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let frames = self.pending.len() / self.channels;
        let mut tail = FrameBuf::with_size(self.channels, frames)
            .map_err(|e| EngineError::Encode(format!("{:?}", e)))?;
        tail.fill_interleaved(&self.pending)
            .map_err(|e| EngineError::Encode(format!("{:?}", e)))?;
        let bytes = self.encode_frame(Some(&tail))?;
        (self.write)(&bytes, frames as u32)?;
        self.pending.clear();
        Ok(())
    }

    /// Encode `buf`, or the block buffer when `None`
    fn encode_frame(&mut self, buf: Option<&FrameBuf>) -> Result<Vec<u8>, EngineError> {
        let buf = buf.unwrap_or(&self.frame_buf);
        let frame = flacenc::encode_fixed_size_frame(
            &self.cfg,
            buf,
            self.frame_number,
            self.stream.stream_info(),
        )
        .map_err(|e| EngineError::Encode(format!("{:?}", e)))?;
        self.frame_number += 1;

        let mut sink = ByteSink::new();
        frame
            .write(&mut sink)
            .map_err(|e| EngineError::Encode(e.to_string()))?;
        let bytes = sink.into_inner();
        trace!(frame = self.frame_number, bytes = bytes.len(), "frame encoded");
        Ok(bytes)
    }
}

/// Streaming FLAC encoder engine
#[derive(Default)]
pub struct FlacencEngine {
    settings: Settings,
    active: Option<ActiveStream>,
    finished: bool,
}

impl FlacencEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unconfigured(&self) -> Result<(), EngineError> {
        if self.active.is_some() || self.finished {
            return Err(EngineError::AlreadyInitialized);
        }
        Ok(())
    }

    fn prepare(&self) -> Result<Prepared, InitError> {
        if self.active.is_some() || self.finished {
            return Err(InitError::AlreadyInitialized);
        }
        let s = self.settings;
        if s.channels == 0 || s.channels > MAX_CHANNELS {
            return Err(InitError::InvalidChannels);
        }
        if !(MIN_BITS_PER_SAMPLE..=MAX_BITS_PER_SAMPLE).contains(&s.bits_per_sample) {
            return Err(InitError::InvalidBitsPerSample);
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&s.sample_rate) {
            return Err(InitError::InvalidSampleRate);
        }
        let block_size = block_size_for_level(s.compression_level);
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
            return Err(InitError::InvalidBlockSize);
        }

        let mut encoder = config::Encoder::default();
        encoder.block_size = block_size;
        let cfg = encoder
            .into_verified()
            .map_err(|(_, e)| InitError::Encoder(format!("{:?}", e)))?;

        let channels = usize::from(s.channels);
        let mut info = StreamInfo::new(
            s.sample_rate as usize,
            channels,
            usize::from(s.bits_per_sample),
        )
        .map_err(|e| InitError::Encoder(format!("{:?}", e)))?;
        info.set_block_sizes(block_size, block_size)
            .map_err(|e| InitError::Encoder(format!("{:?}", e)))?;
        let stream = Stream::with_stream_info(info);

        let frame_buf = FrameBuf::with_size(channels, block_size)
            .map_err(|e| InitError::Encoder(format!("{:?}", e)))?;

        // Stream header with no frames yet: marker plus STREAMINFO
        let mut sink = ByteSink::new();
        stream
            .write(&mut sink)
            .map_err(|e| InitError::Encoder(e.to_string()))?;

        Ok(Prepared {
            cfg,
            stream,
            frame_buf,
            block_size,
            header: sink.into_inner(),
        })
    }

    fn bind(&mut self, prepared: Prepared, mut write: WriteCallback) -> Result<(), InitError> {
        write(&prepared.header, 0)?;
        debug!(
            sample_rate = self.settings.sample_rate,
            channels = self.settings.channels,
            bits_per_sample = self.settings.bits_per_sample,
            block_size = prepared.block_size,
            total_samples = ?self.settings.total_samples,
            "flac stream initialized"
        );
        self.active = Some(ActiveStream {
            cfg: prepared.cfg,
            stream: prepared.stream,
            frame_buf: prepared.frame_buf,
            block_size: prepared.block_size,
            channels: usize::from(self.settings.channels),
            pending: Vec::with_capacity(prepared.block_size * usize::from(self.settings.channels)),
            frame_number: 0,
            write,
        });
        Ok(())
    }

    fn check_range(&self, samples: &[i32]) -> Result<(), EngineError> {
        let bits = u32::from(self.settings.bits_per_sample);
        let max = (1i32 << (bits - 1)) - 1;
        let min = -(1i32 << (bits - 1));
        match samples.iter().position(|s| !(min..=max).contains(s)) {
            Some(i) => Err(EngineError::Verify(format!(
                "sample {} at index {} does not fit in {} bits",
                samples[i], i, bits
            ))),
            None => Ok(()),
        }
    }
}

impl EncodingEngine for FlacencEngine {
    fn set_verify(&mut self, verify: bool) -> Result<(), EngineError> {
        self.ensure_unconfigured()?;
        self.settings.verify = verify;
        Ok(())
    }

    fn set_compression_level(&mut self, level: u8) -> Result<(), EngineError> {
        self.ensure_unconfigured()?;
        if level > MAX_COMPRESSION_LEVEL {
            return Err(EngineError::InvalidParameter {
                name: "compression_level",
                value: u64::from(level),
            });
        }
        self.settings.compression_level = level;
        Ok(())
    }

    fn set_channels(&mut self, channels: u16) -> Result<(), EngineError> {
        self.ensure_unconfigured()?;
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(EngineError::InvalidParameter {
                name: "channels",
                value: u64::from(channels),
            });
        }
        self.settings.channels = channels;
        Ok(())
    }

    fn set_bits_per_sample(&mut self, bits: u8) -> Result<(), EngineError> {
        self.ensure_unconfigured()?;
        if !(MIN_BITS_PER_SAMPLE..=MAX_BITS_PER_SAMPLE).contains(&bits) {
            return Err(EngineError::InvalidParameter {
                name: "bits_per_sample",
                value: u64::from(bits),
            });
        }
        self.settings.bits_per_sample = bits;
        Ok(())
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), EngineError> {
        self.ensure_unconfigured()?;
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(EngineError::InvalidParameter {
                name: "sample_rate",
                value: u64::from(sample_rate),
            });
        }
        self.settings.sample_rate = sample_rate;
        Ok(())
    }

    fn set_total_samples_estimate(&mut self, samples: u64) -> Result<(), EngineError> {
        self.ensure_unconfigured()?;
        // STREAMINFO keeps "unknown"; the hint is only logged
        self.settings.total_samples = Some(samples);
        Ok(())
    }

    fn init_stream(&mut self, write: WriteCallback) -> Result<(), InitError> {
        let prepared = self.prepare()?;
        self.bind(prepared, write)
    }

    fn init_file(&mut self, path: &Path) -> Result<(), InitError> {
        // Validate before touching the filesystem
        let prepared = self.prepare()?;
        let mut file = File::create(path)?;
        self.bind(
            prepared,
            Box::new(move |bytes: &[u8], _samples: u32| file.write_all(bytes)),
        )
    }

    fn process_interleaved(&mut self, samples: &[i32], frames: usize) -> Result<(), EngineError> {
        let channels = usize::from(self.settings.channels);
        let needed = frames * channels;
        if samples.len() < needed {
            return Err(EngineError::Encode(format!(
                "{} frames need {} samples, got {}",
                frames,
                needed,
                samples.len()
            )));
        }
        let samples = &samples[..needed];
        if self.settings.verify {
            self.check_range(samples)?;
        }

        let active = self.active.as_mut().ok_or(EngineError::Uninitialized)?;
        active.pending.extend_from_slice(samples);
        active.encode_full_blocks()
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        let mut active = self.active.take().ok_or(EngineError::Uninitialized)?;
        self.finished = true;
        active.encode_tail()?;
        debug!(frames = active.frame_number, "flac stream finished");
        // Dropping the callback closes file outputs
        drop(active);
        Ok(())
    }
}

/// Allocates [`FlacencEngine`] instances
#[derive(Debug, Clone, Copy, Default)]
pub struct FlacencEngineFactory;

impl EngineFactory for FlacencEngineFactory {
    type Engine = FlacencEngine;

    fn allocate(&self) -> Result<FlacencEngine, EngineError> {
        Ok(FlacencEngine::new())
    }
}
