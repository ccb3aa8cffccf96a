//! Recording engine double for session and adapter tests

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

use super::ports::{EncodingEngine, EngineError, EngineFactory, InitError, WriteCallback};

/// Bytes the mock writes on stream initialization
pub const HEADER: &[u8] = b"HDR";

/// Bytes the mock writes on finish
pub const TRAILER: &[u8] = b"END";

/// One observed call into the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    SetVerify(bool),
    SetCompressionLevel(u8),
    SetChannels(u16),
    SetBitsPerSample(u8),
    SetSampleRate(u32),
    SetTotalSamplesEstimate(u64),
    InitStream,
    InitFile(PathBuf),
    Process { frames: usize },
    Finish,
    Dropped,
}

/// Failure switches for the mock
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    pub fail_allocate: bool,
    pub max_sample_rate: Option<u32>,
    pub fail_init: bool,
    /// Zero-based index of the process call that fails
    pub fail_process_at: Option<usize>,
}

/// Engine that echoes every fed sample back as little-endian i16 bytes
pub struct MockEngine {
    calls: Arc<StdMutex<Vec<EngineCall>>>,
    behavior: MockBehavior,
    channels: usize,
    write: Option<WriteCallback>,
    processed: usize,
}

impl MockEngine {
    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn emit(&mut self, bytes: &[u8], samples: u32) -> Result<(), EngineError> {
        let write = self.write.as_mut().ok_or(EngineError::Uninitialized)?;
        write(bytes, samples)?;
        Ok(())
    }
}

impl EncodingEngine for MockEngine {
    fn set_verify(&mut self, verify: bool) -> Result<(), EngineError> {
        self.record(EngineCall::SetVerify(verify));
        Ok(())
    }

    fn set_compression_level(&mut self, level: u8) -> Result<(), EngineError> {
        self.record(EngineCall::SetCompressionLevel(level));
        Ok(())
    }

    fn set_channels(&mut self, channels: u16) -> Result<(), EngineError> {
        self.record(EngineCall::SetChannels(channels));
        self.channels = usize::from(channels);
        Ok(())
    }

    fn set_bits_per_sample(&mut self, bits: u8) -> Result<(), EngineError> {
        self.record(EngineCall::SetBitsPerSample(bits));
        Ok(())
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), EngineError> {
        self.record(EngineCall::SetSampleRate(sample_rate));
        match self.behavior.max_sample_rate {
            Some(max) if sample_rate > max => Err(EngineError::InvalidParameter {
                name: "sample_rate",
                value: u64::from(sample_rate),
            }),
            _ => Ok(()),
        }
    }

    fn set_total_samples_estimate(&mut self, samples: u64) -> Result<(), EngineError> {
        self.record(EngineCall::SetTotalSamplesEstimate(samples));
        Ok(())
    }

    fn init_stream(&mut self, mut write: WriteCallback) -> Result<(), InitError> {
        self.record(EngineCall::InitStream);
        if self.behavior.fail_init {
            return Err(InitError::InvalidBlockSize);
        }
        write(HEADER, 0)?;
        self.write = Some(write);
        Ok(())
    }

    fn init_file(&mut self, path: &Path) -> Result<(), InitError> {
        self.record(EngineCall::InitFile(path.to_path_buf()));
        if self.behavior.fail_init {
            return Err(InitError::InvalidBlockSize);
        }
        let mut file = File::create(path)?;
        file.write_all(HEADER)?;
        self.write = Some(Box::new(move |bytes: &[u8], _: u32| file.write_all(bytes)));
        Ok(())
    }

    fn process_interleaved(&mut self, samples: &[i32], frames: usize) -> Result<(), EngineError> {
        self.record(EngineCall::Process { frames });
        let index = self.processed;
        self.processed += 1;
        if self.behavior.fail_process_at == Some(index) {
            return Err(EngineError::Verify("mock verification mismatch".to_string()));
        }
        let bytes: Vec<u8> = samples[..frames * self.channels]
            .iter()
            .flat_map(|&s| (s as i16).to_le_bytes())
            .collect();
        self.emit(&bytes, frames as u32)
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Finish);
        self.emit(TRAILER, 0)?;
        self.write = None;
        Ok(())
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(EngineCall::Dropped);
        }
    }
}

/// Factory handing out mock engines that share one call log
#[derive(Clone, Default)]
pub struct MockFactory {
    pub calls: Arc<StdMutex<Vec<EngineCall>>>,
    pub behavior: MockBehavior,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Frame counts of every process call, in order
    pub fn processed_frames(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Process { frames } => Some(frames),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

impl EngineFactory for MockFactory {
    type Engine = MockEngine;

    fn allocate(&self) -> Result<MockEngine, EngineError> {
        if self.behavior.fail_allocate {
            return Err(EngineError::Allocation("mock out of memory".to_string()));
        }
        Ok(MockEngine {
            calls: Arc::clone(&self.calls),
            behavior: self.behavior.clone(),
            channels: 1,
            write: None,
            processed: 0,
        })
    }
}

/// Little-endian PCM bytes for the given samples
pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Reader that fails after yielding `ok_bytes` bytes
pub struct FailingReader {
    pub ok_bytes: usize,
}

impl io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.ok_bytes == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk unplugged"));
        }
        let n = buf.len().min(self.ok_bytes);
        buf[..n].fill(0);
        self.ok_bytes -= n;
        Ok(n)
    }
}
