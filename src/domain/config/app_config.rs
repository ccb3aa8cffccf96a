//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::audio::{
    AudioMimeType, StreamParams, DEFAULT_BITS_PER_SAMPLE, DEFAULT_BUFFER_FRAMES,
    DEFAULT_COMPRESSION_LEVEL,
};

/// Default sample rate (speech capture)
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Default channel count (mono)
pub const DEFAULT_CHANNELS: u16 = 1;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub bits_per_sample: Option<u8>,
    pub compression_level: Option<u8>,
    pub block_frames: Option<usize>,
    pub format: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            channels: Some(DEFAULT_CHANNELS),
            bits_per_sample: Some(DEFAULT_BITS_PER_SAMPLE),
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
            block_frames: Some(DEFAULT_BUFFER_FRAMES),
            format: Some(AudioMimeType::Flac.extension().to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            sample_rate: other.sample_rate.or(self.sample_rate),
            channels: other.channels.or(self.channels),
            bits_per_sample: other.bits_per_sample.or(self.bits_per_sample),
            compression_level: other.compression_level.or(self.compression_level),
            block_frames: other.block_frames.or(self.block_frames),
            format: other.format.or(self.format),
        }
    }

    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    pub fn channels_or_default(&self) -> u16 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    pub fn bits_per_sample_or_default(&self) -> u8 {
        self.bits_per_sample.unwrap_or(DEFAULT_BITS_PER_SAMPLE)
    }

    pub fn compression_level_or_default(&self) -> u8 {
        self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn block_frames_or_default(&self) -> usize {
        self.block_frames.unwrap_or(DEFAULT_BUFFER_FRAMES)
    }

    /// Get format as parsed AudioMimeType, or FLAC if not set/invalid
    pub fn format_or_default(&self) -> AudioMimeType {
        self.format
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Build stream parameters from the resolved settings
    pub fn stream_params(&self) -> StreamParams {
        StreamParams::new(self.sample_rate_or_default(), self.channels_or_default())
            .with_bits_per_sample(self.bits_per_sample_or_default())
            .with_compression_level(self.compression_level_or_default())
            .with_buffer_frames(self.block_frames_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_set() {
        let config = AppConfig::defaults();
        assert_eq!(config.sample_rate, Some(16000));
        assert_eq!(config.channels, Some(1));
        assert_eq!(config.bits_per_sample, Some(16));
        assert_eq!(config.compression_level, Some(5));
        assert_eq!(config.block_frames, Some(1024));
        assert_eq!(config.format.as_deref(), Some("flac"));
    }

    #[test]
    fn empty_has_no_values() {
        let config = AppConfig::empty();
        assert!(config.sample_rate.is_none());
        assert!(config.format.is_none());
    }

    #[test]
    fn merge_prefers_other() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            sample_rate: Some(48000),
            channels: Some(2),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.sample_rate, Some(48000));
        assert_eq!(merged.channels, Some(2));
        assert_eq!(merged.compression_level, Some(5));
    }

    #[test]
    fn merge_keeps_base_when_other_empty() {
        let merged = AppConfig::defaults().merge(AppConfig::empty());
        assert_eq!(merged, AppConfig::defaults());
    }

    #[test]
    fn format_or_default_falls_back() {
        let config = AppConfig {
            format: Some("ogg".to_string()),
            ..Default::default()
        };
        assert_eq!(config.format_or_default(), AudioMimeType::Flac);

        let config = AppConfig {
            format: Some("wav".to_string()),
            ..Default::default()
        };
        assert_eq!(config.format_or_default(), AudioMimeType::Wav);
    }

    #[test]
    fn stream_params_from_config() {
        let config = AppConfig {
            sample_rate: Some(44100),
            channels: Some(2),
            compression_level: Some(8),
            block_frames: Some(960),
            ..Default::default()
        };
        let params = config.stream_params();
        assert_eq!(params.sample_rate, 44100);
        assert_eq!(params.channels, 2);
        assert_eq!(params.bits_per_sample, 16);
        assert_eq!(params.compression_level, 8);
        assert_eq!(params.buffer_frames, 960);
    }

    #[test]
    fn toml_round_trip() {
        let config = AppConfig::defaults();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
