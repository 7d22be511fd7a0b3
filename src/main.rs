//! drive_drain CLI - Download and delete every file in a Google Drive folder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_drain::auth::DRIVE_SCOPE;
use drive_drain::client::DRIVE_API_BASE;
use drive_drain::models::format_size;
use drive_drain::{drain_folder, Authenticator, ConsolePrompt, DriveClient, OAuthConfig, TokenCache};

/// Folder drained when none is given.
const DEFAULT_FOLDER_ID: &str = "1Pd40ooqAQD7Y5Yn6QK162fVHT5i9UZkK";

/// Download every file in a Google Drive folder, deleting each from Drive once saved.
#[derive(Parser)]
#[command(name = "drive_drain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the OAuth client secret JSON file.
    #[arg(long, env = "DRIVE_DRAIN_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,

    /// Path of the cached OAuth token.
    #[arg(long, env = "DRIVE_DRAIN_TOKEN_CACHE", default_value = "token.json")]
    token_cache: PathBuf,

    /// ID of the Drive folder to drain.
    #[arg(long, env = "DRIVE_DRAIN_FOLDER", default_value = DEFAULT_FOLDER_ID)]
    folder: String,

    /// Directory downloaded files are written to.
    #[arg(long, short = 'o', env = "DRIVE_DRAIN_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Drive API base URL.
    #[arg(long, env = "DRIVE_DRAIN_API_BASE", default_value = DRIVE_API_BASE, hide = true)]
    api_base: String,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = OAuthConfig::from_file(&cli.credentials, &[DRIVE_SCOPE])
        .with_context(|| format!("Unable to read client secret file {:?}", cli.credentials))?;

    let auth = Authenticator::obtain(config, TokenCache::new(&cli.token_cache), &mut ConsolePrompt)
        .await
        .context("Unable to obtain an access token")?;

    let client = DriveClient::with_api_base(auth, cli.api_base);

    let report = drain_folder(&client, &cli.folder, &cli.output)
        .await
        .with_context(|| format!("Unable to drain folder {}", cli.folder))?;

    if report.files > 0 {
        println!(
            "Done. {} file(s), {}.",
            report.files,
            format_size(report.bytes)
        );
    }

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Declared default and env fallback of an argument, independent of the
    /// current environment.
    fn declared(id: &str) -> (String, Option<String>) {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id().as_str() == id)
            .unwrap();
        let default = arg.get_default_values()[0].to_string_lossy().into_owned();
        let env = arg.get_env().map(|e| e.to_string_lossy().into_owned());
        (default, env)
    }

    #[test]
    fn test_cli_defaults() {
        assert_eq!(
            declared("credentials"),
            ("credentials.json".to_string(), Some("DRIVE_DRAIN_CREDENTIALS".to_string()))
        );
        assert_eq!(
            declared("token_cache"),
            ("token.json".to_string(), Some("DRIVE_DRAIN_TOKEN_CACHE".to_string()))
        );
        assert_eq!(
            declared("folder"),
            (DEFAULT_FOLDER_ID.to_string(), Some("DRIVE_DRAIN_FOLDER".to_string()))
        );
        assert_eq!(
            declared("output"),
            (".".to_string(), Some("DRIVE_DRAIN_OUTPUT".to_string()))
        );
        assert_eq!(declared("api_base").0, DRIVE_API_BASE);
    }

    #[test]
    fn test_verbose_defaults_to_zero() {
        let cli = Cli::try_parse_from(["drive_drain"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "drive_drain",
            "--folder",
            "0Bxyz",
            "-o",
            "/tmp/inbox",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.folder, "0Bxyz");
        assert_eq!(cli.output, PathBuf::from("/tmp/inbox"));
        assert_eq!(cli.verbose, 2);
    }
}
