use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use fresh_repos::api;
use fresh_repos::cache::SnapshotCache;
use fresh_repos::config::Config;
use fresh_repos::ingest::{self, IngestOptions};
use fresh_repos::source::github::GitHubSource;
use fresh_repos::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("GitHub API: {}", config.github_api_url);

    let cache = Arc::new(SnapshotCache::new());
    let source = Arc::new(GitHubSource::new(&config)?);
    let options = IngestOptions::from(&config.ingest);

    // Block until the first snapshot is published so search results are
    // meaningful as soon as the listener is up.
    ingest::refresh(&source, &options, &cache).await?;

    let bind_addr = config.bind_addr();
    let state = AppState::new(cache);

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
