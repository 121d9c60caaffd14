use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod intake;

use config::load_settings;
use intake::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let app = build_router(Arc::new(AppState::default()), settings.max_body_bytes);

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, max_body_bytes = settings.max_body_bytes, "intake server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
