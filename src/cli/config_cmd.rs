//! Config command handler

use std::fmt::Display;
use std::str::FromStr;

use crate::application::ports::ConfigStore;
use crate::domain::audio::AudioMimeType;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::infrastructure::engine::{
    MAX_BITS_PER_SAMPLE, MAX_BLOCK_SIZE, MAX_CHANNELS, MAX_COMPRESSION_LEVEL, MAX_SAMPLE_RATE,
    MIN_BITS_PER_SAMPLE, MIN_BLOCK_SIZE, MIN_SAMPLE_RATE,
};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(&lookup(&config, key).unwrap_or_else(|| NOT_SET.to_string()));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            &lookup(&config, key).unwrap_or_else(|| NOT_SET.to_string()),
        );
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Current value of `key`, formatted for display
fn lookup(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "sample_rate" => config.sample_rate.map(|v| v.to_string()),
        "channels" => config.channels.map(|v| v.to_string()),
        "bits_per_sample" => config.bits_per_sample.map(|v| v.to_string()),
        "compression_level" => config.compression_level.map(|v| v.to_string()),
        "block_frames" => config.block_frames.map(|v| v.to_string()),
        "format" => config.format.clone(),
        _ => None,
    }
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "sample_rate" => {
            config.sample_rate = Some(parse_in_range(key, value, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)?)
        }
        "channels" => config.channels = Some(parse_in_range(key, value, 1, MAX_CHANNELS)?),
        "bits_per_sample" => {
            config.bits_per_sample = Some(parse_in_range(
                key,
                value,
                MIN_BITS_PER_SAMPLE,
                MAX_BITS_PER_SAMPLE,
            )?)
        }
        "compression_level" => {
            config.compression_level = Some(parse_in_range(key, value, 0, MAX_COMPRESSION_LEVEL)?)
        }
        "block_frames" => {
            config.block_frames = Some(parse_in_range(key, value, MIN_BLOCK_SIZE, MAX_BLOCK_SIZE)?)
        }
        "format" => {
            let format: AudioMimeType =
                value.parse().map_err(|message| ConfigError::ValidationError {
                    key: key.to_string(),
                    message,
                })?;
            config.format = Some(format.extension().to_string());
        }
        _ => return check_key(key),
    }
    Ok(())
}

/// Parse a number and check it against an inclusive range
fn parse_in_range<T>(key: &str, value: &str, min: T, max: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Display,
{
    let invalid = || ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Value must be a number from {} to {}", min, max),
    };
    let parsed: T = value.trim().parse().map_err(|_| invalid())?;
    if parsed < min || parsed > max {
        return Err(invalid());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_in_range_bounds() {
        assert_eq!(parse_in_range("channels", "1", 1u16, 8).unwrap(), 1);
        assert_eq!(parse_in_range("channels", " 8 ", 1u16, 8).unwrap(), 8);
        assert!(parse_in_range("channels", "0", 1u16, 8).is_err());
        assert!(parse_in_range("channels", "9", 1u16, 8).is_err());
        assert!(parse_in_range("channels", "two", 1u16, 8).is_err());
    }

    #[test]
    fn apply_numeric_values() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "sample_rate", "44100").unwrap();
        apply_value(&mut config, "compression_level", "0").unwrap();
        apply_value(&mut config, "block_frames", "960").unwrap();
        assert_eq!(config.sample_rate, Some(44100));
        assert_eq!(config.compression_level, Some(0));
        assert_eq!(config.block_frames, Some(960));
    }

    #[test]
    fn apply_rejects_out_of_range() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "sample_rate", "0").is_err());
        assert!(apply_value(&mut config, "compression_level", "9").is_err());
        assert!(apply_value(&mut config, "bits_per_sample", "32").is_err());
        assert!(apply_value(&mut config, "block_frames", "8").is_err());
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn format_is_normalized() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "format", "audio/wav").unwrap();
        assert_eq!(config.format.as_deref(), Some("wav"));
        assert!(apply_value(&mut config, "format", "mp3").is_err());
    }

    #[test]
    fn lookup_formats_values() {
        let config = AppConfig::defaults();
        assert_eq!(lookup(&config, "sample_rate").as_deref(), Some("16000"));
        assert_eq!(lookup(&config, "format").as_deref(), Some("flac"));
        assert_eq!(lookup(&AppConfig::empty(), "channels"), None);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(
            check_key("api_key"),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
