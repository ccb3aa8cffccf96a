//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::audio::AudioMimeType;
use crate::domain::config::AppConfig;

/// flac-bridge - Stream raw PCM into FLAC
#[derive(Parser, Debug)]
#[command(name = "flac-bridge")]
#[command(version)]
#[command(about = "Encode raw 16-bit little-endian PCM into FLAC, from files or stdin")]
#[command(long_about = None)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a raw PCM file into a FLAC file
    Encode {
        /// Raw PCM input file
        input: PathBuf,
        /// FLAC output file
        output: PathBuf,
        #[command(flatten)]
        stream: StreamArgs,
        /// Print a JSON report instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Encode raw PCM from stdin to stdout as it arrives
    Stream {
        #[command(flatten)]
        stream: StreamArgs,
        /// Output container
        #[arg(short = 'f', long, value_name = "FORMAT")]
        format: Option<FormatArg>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Stream parameters shared by the encoding commands
#[derive(Args, Debug, Clone, Default)]
pub struct StreamArgs {
    /// Sample rate in Hz
    #[arg(short = 'r', long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Interleaved channel count
    #[arg(short = 'c', long, value_name = "N")]
    pub channels: Option<u16>,

    /// Bits per sample declared in the stream header
    #[arg(short = 'b', long, value_name = "BITS")]
    pub bits_per_sample: Option<u8>,

    /// Compression level (0-8)
    #[arg(short = 'l', long = "level", value_name = "LEVEL")]
    pub compression_level: Option<u8>,

    /// Frames read and encoded per block
    #[arg(long, value_name = "N")]
    pub block_frames: Option<usize>,
}

impl StreamArgs {
    /// Flags as a partial config for merging over the file config
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bits_per_sample: self.bits_per_sample,
            compression_level: self.compression_level,
            block_frames: self.block_frames,
            format: None,
        }
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Output format argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Flac,
    Wav,
}

impl From<FormatArg> for AudioMimeType {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Flac => AudioMimeType::Flac,
            FormatArg::Wav => AudioMimeType::Wav,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "sample_rate",
    "channels",
    "bits_per_sample",
    "compression_level",
    "block_frames",
    "format",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_encode() {
        let cli = Cli::parse_from(["flac-bridge", "encode", "in.raw", "out.flac"]);
        match cli.command {
            Commands::Encode {
                input,
                output,
                stream,
                json,
            } => {
                assert_eq!(input, PathBuf::from("in.raw"));
                assert_eq!(output, PathBuf::from("out.flac"));
                assert!(stream.sample_rate.is_none());
                assert!(!json);
            }
            other => panic!("Expected Encode command, got {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_parses_stream_flags() {
        let cli = Cli::parse_from([
            "flac-bridge", "stream", "-r", "48000", "-c", "2", "-l", "8", "--block-frames", "960",
            "--format", "wav",
        ]);
        if let Commands::Stream { stream, format } = cli.command {
            assert_eq!(stream.sample_rate, Some(48000));
            assert_eq!(stream.channels, Some(2));
            assert_eq!(stream.compression_level, Some(8));
            assert_eq!(stream.block_frames, Some(960));
            assert_eq!(format, Some(FormatArg::Wav));
        } else {
            panic!("Expected Stream command");
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["flac-bridge", "stream", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn stream_args_to_config() {
        let args = StreamArgs {
            channels: Some(2),
            ..Default::default()
        };
        let config = args.to_config();
        assert_eq!(config.channels, Some(2));
        assert!(config.sample_rate.is_none());
        assert!(config.format.is_none());
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["flac-bridge", "config", "set", "sample_rate", "44100"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "sample_rate");
            assert_eq!(value, "44100");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn format_arg_converts_to_mime() {
        assert_eq!(AudioMimeType::from(FormatArg::Flac), AudioMimeType::Flac);
        assert_eq!(AudioMimeType::from(FormatArg::Wav), AudioMimeType::Wav);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("sample_rate"));
        assert!(is_valid_config_key("format"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
