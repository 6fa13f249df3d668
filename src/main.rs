//! Showscribe CLI
//!
//! `serve` runs the HTTP service; `fetch` scrapes a single episode
//! transcript to stdout without going through the HTTP layer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use showscribe::{CdpLauncher, Config, RedisCache, ScrapeError, TranscriptService};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "showscribe")]
#[command(about = "Fetch Screenhall episode transcripts through an authenticated browser session")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve,

    /// Fetch a single episode transcript and print it
    Fetch {
        /// Episode identifier
        id: String,

        /// Output the full response as JSON instead of the raw transcript
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let cache = RedisCache::connect(&config.redis_url).await?;
    info!("Cache connection established");

    let launcher = CdpLauncher::new(config.headless);
    let service = Arc::new(TranscriptService::new(
        &config,
        Arc::new(cache),
        Arc::new(launcher),
    ));

    match cli.command {
        Commands::Serve => {
            showscribe::server::serve(config.listen_addr, service).await?;
        }

        Commands::Fetch { id, json } => match service.fetch(&id).await {
            Ok(response) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    println!("{}", response.transcript);
                }
            }
            Err(ScrapeError::ContentUnavailable) => {
                eprintln!("No transcript available for {}", id);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Failed to fetch transcript: {}", e);
                return Err(e.into());
            }
        },
    }

    Ok(())
}
