//! icloud-album - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use icloud_album::{
    api::{client::describe_token_error, types::Album, SharedStreamApi},
    cli::{Args, Command},
    config::{parse_album_token, validate_config, Config},
    download::download_album,
    error::{exit_codes, Error, Result},
    fs::get_album_folder,
    output::{
        create_spinner, print_album_details, print_album_summary, print_album_warnings,
        print_download_stats, print_error, print_info, print_success, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            if let Some(hint) = describe_token_error(&e) {
                print_info(hint);
            }
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::TomlParse(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::InvalidToken(_) | Error::UrlParse(_) => {
                    ExitCode::from(exit_codes::USAGE_ERROR as u8)
                }
                Error::Transport(_)
                | Error::Status { .. }
                | Error::MissingField(_)
                | Error::Json(_) => ExitCode::from(exit_codes::API_ERROR as u8),
                Error::NoDerivative(_) | Error::InvalidFilename(_) | Error::Io(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = Config::load_or_default(args.config.as_deref())?;

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    let token = parse_album_token(args.command.album())?;

    let api = SharedStreamApi::new(
        config.client.timeout(),
        &config.client.user_agent,
        config.retry.to_policy(),
    )?
    .with_asset_url_failure(config.options.asset_url_failure);

    let spinner = create_spinner(&format!("Fetching album {}...", token));
    let fetched = api.fetch_album(token.as_str()).await;
    spinner.finish_and_clear();
    let album = fetched?;

    print_album_warnings(&album);

    match &args.command {
        Command::Info { .. } => {
            print_album_summary(&album);
            Ok(exit_codes::SUCCESS)
        }
        Command::Fetch { .. } => {
            print_album_details(&album);
            Ok(exit_codes::SUCCESS)
        }
        Command::Download { .. } => download(&api, &config, &album).await,
    }
}

/// Download the album and report statistics.
async fn download(api: &SharedStreamApi, config: &Config, album: &Album) -> Result<i32> {
    let output_dir = get_album_folder(config, &album.metadata.stream_name);
    print_info(&format!(
        "Downloading '{}' to {}",
        album.metadata.stream_name,
        output_dir.display()
    ));

    let state = download_album(
        api,
        album,
        &output_dir,
        config.options.concurrent_downloads,
        true,
    )
    .await?;

    print_download_stats(&state);

    if state.failed_count() > 0 {
        print_warning(&format!(
            "{} of {} photos failed",
            state.failed_count(),
            state.total_photos
        ));
        return Ok(exit_codes::DOWNLOAD_ERROR);
    }

    print_success(&format!("Downloaded {} photos", state.total_downloaded()));
    Ok(exit_codes::SUCCESS)
}
