//! Single-page web UI for the daily briefing.
//! One user, one session: pick a profile, press refresh, read the briefing.

use anyhow::{Context, Result};
use clap::Parser;
use shared::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;
mod state;

use state::AppState;

#[derive(Parser)]
#[command(name = "briefing-web")]
#[command(about = "Serve the daily briefing as a single web page")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8501")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let missing = config.credentials.missing();
    if !missing.is_empty() {
        let vars: Vec<&str> = missing.iter().map(|p| p.env_var()).collect();
        tracing::warn!(
            "Missing API keys: {}. Briefings will fail until they are set.",
            vars.join(", ")
        );
    }

    tracing::info!(data_dir = %config.data_dir.display(), "Loaded configuration");

    let app = routes::router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;
    tracing::info!("Daily briefing available at http://{}", args.addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
