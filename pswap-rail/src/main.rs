//! pswap-rail
//!
//! HTTP service for the privacy-swap pool.

use std::{env, net::SocketAddr};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pswap_rail::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pswap_rail=debug,pswap_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("privacy-swap rail service listening on {}", addr);

    let state = AppState::in_memory();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app_router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install CTRL+C signal handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
