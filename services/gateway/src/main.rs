use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod routes;
mod state;

use common::{AccessGuard, AccessPolicy};
use tokio::net::TcpListener;

use crate::{config::GatewayConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting SIGESTEI gateway");

    let config = GatewayConfig::from_env()?;
    let verifier = config.build_verifier()?;

    let policy = AccessPolicy::sigestei();
    for prefix in policy.unreachable_prefixes() {
        warn!("Protected prefix {} is not in any role allow-list", prefix);
    }

    let app_state = AppState::new(AccessGuard::new(policy, verifier));

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Gateway listening on {}", config.addr);

    axum::serve(listener, app).await?;

    Ok(())
}
