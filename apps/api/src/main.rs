mod config;
mod detection;
mod errors;
mod fetch;
mod models;
mod routes;
mod state;
mod store;
mod terms;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JsonFileStore;
use crate::terms::service::TermService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting termwatch v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonFileStore::new(&config.data_file);
    store.ensure_exists().await?;
    info!("Using store at {}", store.path().display());

    let fetcher = HttpFetcher::new(config.fetch_timeout, &config.user_agent)?;
    info!(
        "HTTP fetcher initialized (timeout: {}s)",
        config.fetch_timeout.as_secs()
    );

    let state = AppState {
        service: Arc::new(TermService::new(Arc::new(store), Arc::new(fetcher))),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
