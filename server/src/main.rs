//! LinkPool Server
//!
//! Manages a shared pool of third-party meeting links for scheduled class
//! sessions: availability lookup, atomic reservation and release, and
//! usage statistics, behind a small HTTP booking API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod infra;
mod service;

pub use config::Config;
pub use error::{Error, Result};

use infra::sqlite::SqliteLinkRepository;
use infra::store::LinkStore;
use service::availability::AvailabilityFinder;
use service::registry::LinkRegistry;
use service::release::ReleaseManager;
use service::reservation::ReservationManager;
use service::stats::UsageStatsCalculator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<LinkRegistry>,
    pub finder: Arc<AvailabilityFinder>,
    pub reservations: Arc<ReservationManager>,
    pub releases: Arc<ReleaseManager>,
    pub stats: Arc<UsageStatsCalculator>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::load()?);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let http_addr: SocketAddr = format!("{}:{}", config.http_host, config.http_port).parse()?;

    info!("Starting LinkPool Server");
    info!("HTTP listening on {}", http_addr);

    // Initialize infrastructure
    let pool = SqliteLinkRepository::init(&config.database_url).await?;
    let store: Arc<dyn LinkStore> = Arc::new(SqliteLinkRepository::new(pool));

    // Initialize services; one registry instance owns the pool for the
    // whole process
    let state = AppState {
        config: config.clone(),
        registry: Arc::new(LinkRegistry::new(store.clone())),
        finder: Arc::new(AvailabilityFinder::new(store.clone())),
        reservations: Arc::new(ReservationManager::new(store.clone())),
        releases: Arc::new(ReleaseManager::new(store.clone())),
        stats: Arc::new(UsageStatsCalculator::new(store)),
    };

    let app = api::http::create_router(state);

    axum::serve(
        tokio::net::TcpListener::bind(http_addr).await?,
        app.into_make_service(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
