//! flac-bridge CLI entry point

use std::process::ExitCode;

use clap::Parser;

use flac_bridge::cli::{
    app::{load_merged_config, run_encode, run_stream, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging,
    presenter::Presenter,
};
use flac_bridge::domain::audio::AudioMimeType;
use flac_bridge::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Config { action } => {
            let presenter = Presenter::new();
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Encode {
            input,
            output,
            stream,
            json,
        } => {
            let config = load_merged_config(stream.to_config()).await;
            run_encode(input, output, config.stream_params(), json).await
        }
        Commands::Stream { stream, format } => {
            let config = load_merged_config(stream.to_config()).await;
            let format = format
                .map(AudioMimeType::from)
                .unwrap_or_else(|| config.format_or_default());
            run_stream(config.stream_params(), format).await
        }
    }
}
