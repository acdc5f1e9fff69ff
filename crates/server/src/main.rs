use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shared::{Studio, StudioConfig};

mod error;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Studio>,
}

#[derive(Debug, Parser)]
#[command(about = "Foreground compositing and image-to-3D web studio")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenecraft_server=info,shared=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = StudioConfig::load(args.config.as_deref()).context("failed to load config")?;
    config
        .ensure_dirs()
        .context("failed to create upload folders")?;
    tracing::info!("serving files from {}", config.paths.static_dir.display());

    let state = AppState {
        studio: Arc::new(Studio::from_config(config)),
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", args.host, args.port))?;
    tracing::info!("Server running on http://{}:{}", args.host, args.port);
    axum::serve(listener, app).await?;
    Ok(())
}
