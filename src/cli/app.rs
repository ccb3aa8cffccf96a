//! Command runners for encode and stream modes

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{ConfigStore, StreamEncoder};
use crate::application::{pipe_stream, BatchConverter, ConversionReport, PipeStats, PushEncoder};
use crate::domain::audio::{AudioMimeType, StreamParams};
use crate::domain::config::AppConfig;
use crate::domain::error::EncoderError;
use crate::infrastructure::{FlacencEngineFactory, WavEncoder, XdgConfigStore};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    load_merged_config_from(&XdgConfigStore::new(), cli_config).await
}

/// Merge: defaults < file < cli
pub async fn load_merged_config_from<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %store.path().display(), error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Encode a raw PCM file into a FLAC file
pub async fn run_encode(input: PathBuf, output: PathBuf, params: StreamParams, json: bool) -> ExitCode {
    let mut presenter = Presenter::new();
    if output.exists() && !json {
        presenter.warn(&format!("Overwriting {}", output.display()));
    }

    let total = std::fs::metadata(&input)
        .ok()
        .map(|m| m.len() / params.bytes_per_frame().max(1) as u64);
    let bar = if json {
        None
    } else {
        Some(presenter.start_progress(
            &format!("Encoding {}", display_name(&input)),
            total,
        ))
    };

    let progress = bar.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut converter = BatchConverter::new(FlacencEngineFactory);
        if let Some(bar) = progress {
            converter = converter.with_progress(Arc::new(move |done, _| bar.set_position(done)));
        }
        converter.convert(&input, &output, params)
    });

    match join(task).await {
        Ok(report) => {
            if json {
                print_json(&presenter, &report)
            } else {
                let summary = presenter.format_report(&report);
                presenter.progress_success(&summary);
                ExitCode::from(EXIT_SUCCESS)
            }
        }
        Err(e) => {
            presenter.progress_fail(&e.to_string());
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Encode raw PCM from stdin to stdout
pub async fn run_stream(params: StreamParams, format: AudioMimeType) -> ExitCode {
    let presenter = Presenter::new();

    let task = tokio::task::spawn_blocking(move || -> Result<PipeStats, EncoderError> {
        let mut encoder: Box<dyn StreamEncoder> = match format {
            AudioMimeType::Flac => Box::new(PushEncoder::new(&FlacencEngineFactory)?),
            AudioMimeType::Wav => Box::new(WavEncoder::new()),
        };
        let stdin = io::stdin();
        let stdout = io::stdout();
        pipe_stream(encoder.as_mut(), params, &mut stdin.lock(), &mut stdout.lock())
    });

    match join(task).await {
        Ok(stats) => {
            debug!(frames = stats.frames, bytes_out = stats.bytes_out, "stream complete");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(EncoderError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("stdout closed by reader");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn join<T>(task: tokio::task::JoinHandle<Result<T, EncoderError>>) -> Result<T, EncoderError> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(EncoderError::Io(io::Error::new(io::ErrorKind::Other, e.to_string()))),
    }
}

fn print_json(presenter: &Presenter, report: &ConversionReport) -> ExitCode {
    match serde_json::to_string_pretty(report) {
        Ok(json) => {
            presenter.output(&json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Failed to serialize report: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Rejected parameters are a usage problem; everything else is a runtime failure
pub fn exit_code_for(err: &EncoderError) -> u8 {
    match err {
        EncoderError::ConfigurationRejected(_) => EXIT_USAGE_ERROR,
        _ => EXIT_ERROR,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cli_flags_override_file_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        store
            .save(&AppConfig {
                sample_rate: Some(44100),
                channels: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        let merged = load_merged_config_from(
            &store,
            AppConfig {
                channels: Some(1),
                ..Default::default()
            },
        )
        .await;

        assert_eq!(merged.sample_rate, Some(44100));
        assert_eq!(merged.channels, Some(1));
        assert_eq!(merged.compression_level, Some(5));
    }

    #[tokio::test]
    async fn broken_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sample_rate = [").unwrap();

        let merged =
            load_merged_config_from(&XdgConfigStore::with_path(path), AppConfig::empty()).await;
        assert_eq!(merged, AppConfig::defaults());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(
            exit_code_for(&EncoderError::ConfigurationRejected("bad".into())),
            EXIT_USAGE_ERROR
        );
        assert_eq!(
            exit_code_for(&EncoderError::EncodeRejected("bad".into())),
            EXIT_ERROR
        );
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/tmp/a/in.raw")), "in.raw");
    }
}
