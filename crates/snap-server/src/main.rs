//! Snap game server.

use anyhow::Context;
use snap_core::EngineConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod server;
mod session;

use server::ServerState;

/// Read an optional setting from the environment
fn env_setting<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw
                .parse()
                .with_context(|| format!("Invalid value for {}: {:?}", name, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

/// Engine defaults with environment overrides
fn engine_config_from_env() -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::default();

    if let Some(ms) = env_setting("SNAP_REACTION_DELAY_MS")? {
        config.reaction_delay_ms = ms;
    }
    if let Some(ms) = env_setting("SNAP_PLAY_DELAY_MS")? {
        config.play_delay_ms = ms;
    }
    if let Some(ms) = env_setting("SNAP_INITIAL_DELAY_MS")? {
        config.initial_delay_ms = ms;
    }
    if let Some(auto_continue) = env_setting("SNAP_AUTO_CONTINUE")? {
        config.auto_continue = auto_continue;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse address from env or use default
    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;

    let config = engine_config_from_env()?;
    info!("Starting Snap server with {:?}", config);

    let state = Arc::new(ServerState::new(config));

    server::run_server(addr, state).await
}
