//! Artist style dictionary server.

use std::path::PathBuf;
use std::process::ExitCode;

use artist_style::server::ArtistStore;
use artist_style::{ProviderTable, Server, ServerConfig, StyleResult};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "style-server")]
#[command(version, about = "Artist style dictionary and generation proxy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Copy the artists file to a timestamped backup
    Backup {
        #[arg(default_value = "backups")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_logging();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Backup { dir } => backup(dir).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

async fn serve() -> StyleResult<()> {
    let config = ServerConfig::from_env()?;
    tracing::info!("artists file: {}", config.artists_file.display());
    let server = Server::start(config, ProviderTable::http()?).await?;
    tracing::info!("API endpoint: http://{}/api/artists", server.addr());

    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {error}");
    }
    tracing::info!("shutting down");
    server.stop().await
}

async fn backup(dir: PathBuf) -> StyleResult<()> {
    let config = ServerConfig::from_env()?;
    let store = ArtistStore::new(config.artists_file);
    let (target, count) = store.backup(&dir, chrono::Utc::now()).await?;
    tracing::info!("backup created: {} ({count} artists)", target.display());
    Ok(())
}
