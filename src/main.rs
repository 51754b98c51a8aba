use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use newsdesk::config::Config;
use newsdesk::http::{self, AppState};
use newsdesk::news::NewsClient;
use newsdesk::storage::Database;
use newsdesk::summarizer::Summarizer;

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Personalized news aggregation backend")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, value_name = "FILE", default_value = "newsdesk.toml")]
    config: PathBuf,

    /// Override the database path from the config file
    #[arg(long, value_name = "FILE")]
    db: Option<String>,

    /// Override the bind address from the config file
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config).context("Failed to load configuration")?;
    if let Some(db) = args.db {
        config.database_path = db;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    if args.reset_db && config.database_path != ":memory:" {
        match std::fs::remove_file(&config.database_path) {
            Ok(()) => tracing::info!(path = %config.database_path, "Database reset"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("Failed to reset database"),
        }
    }

    let db = Database::open(&config.database_path)
        .await
        .context("Failed to open database")?;

    if config.news_api_key.is_none() {
        tracing::warn!("No news API key configured; article refreshes will be rejected upstream");
    }
    let news = NewsClient::new(config.news_api_key.clone(), config.news_base_url.clone())
        .context("Failed to build news client")?;

    let summarizer = config
        .openai_api_key
        .clone()
        .map(|key| Summarizer::new(key, config.openai_base_url.clone()));
    if summarizer.is_none() {
        tracing::info!("No LLM API key configured; summarization endpoint disabled");
    }

    let state = AppState::new(db, news, summarizer, config.token_ttl_hours);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "Listening");

    axum::serve(listener, http::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
