//! EDGAR Explorer CLI - serve the REST proxy or inspect the cache

use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use edgar_explorer::config::{self, ExplorerConfig};
use edgar_explorer::provider::{EdgarClient, ProviderConfig};
use edgar_explorer::ui;
use edgar_explorer::{CacheStore, Explorer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "edgar-explorer")]
#[command(version)]
#[command(about = "REST proxy over SEC EDGAR filings with a local SQLite cache")]
#[command(long_about = r#"
EDGAR Explorer serves company, filing, financial statement and attachment
data from SEC EDGAR over a small JSON API, caching what it fetches.

The SEC asks every client to identify itself. Set your identity with:
  export EDGAR_IDENTITY='Your Name your.email@example.com'

Example usage:
  edgar-explorer serve --port 8000
  edgar-explorer stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the cache database
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Directory holding the landing page
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show row counts of the cache tables
    Stats {
        /// Path to the cache database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Serve { host, port, database, static_dir } => {
            serve(file_config, host, port, database, static_dir).await?;
        }

        Commands::Stats { database } => {
            let database = database.unwrap_or_else(|| file_config.database_path());
            let store = CacheStore::open(&database)?;
            let stats = store.stats()?;

            ui::cache_report(&database, &stats);
        }
    }

    Ok(())
}

async fn serve(
    file_config: ExplorerConfig,
    host: Option<IpAddr>,
    port: Option<u16>,
    database: Option<PathBuf>,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let identity = match config::resolve_identity(
        std::env::var(config::IDENTITY_ENV).ok(),
        file_config.identity.as_deref(),
    ) {
        Some(identity) => {
            tracing::info!("EDGAR identity set to: {}", identity);
            identity
        }
        None => {
            tracing::warn!("{} is not set; the SEC may reject anonymous requests", config::IDENTITY_ENV);
            ui::identity_hint(config::IDENTITY_ENV);
            config::FALLBACK_IDENTITY.to_string()
        }
    };

    let database = database.unwrap_or_else(|| file_config.database_path());
    config::ensure_db_dir(&database)?;
    let store = CacheStore::open(&database)?;

    let provider = EdgarClient::new(
        ProviderConfig::new(identity.clone()).with_timeout(file_config.request_timeout()),
    )?;
    let explorer = Explorer::new(Arc::new(provider), store)
        .with_filings_ttl(file_config.filings_ttl());

    let host = match host {
        Some(host) => host,
        None => file_config.host().parse()?,
    };
    let addr = SocketAddr::new(host, port.unwrap_or_else(|| file_config.port()));
    let static_dir = static_dir.unwrap_or_else(|| file_config.static_dir());

    ui::startup_banner(&identity, &database, addr);

    edgar_explorer::server::start_server(addr, explorer, &static_dir).await
}
