//! The gatekeeper's web server.

use gatekeeper::{api, AppState, Config};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// # Errors
///
/// See implementation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading the config first also loads `.env`, which may set `RUST_LOG`.
    let config = Config::from_env()?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!(?config, "loaded configuration");

    let address = config.address.clone();
    let state = AppState::new(config)?;

    info!("Listening to {address}...");

    let listener = TcpListener::bind(&address).await?;

    info!("Ready!");

    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
