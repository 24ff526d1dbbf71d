//! Account settings server entry-point: loads configuration, wires the
//! in-memory account store and serves the REST API.

mod server;

use std::sync::Arc;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use account_settings::inbound::http::session_config::{BuildMode, session_settings_from_env};
use account_settings::outbound::memory::InMemoryAccounts;
use server::{AppConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app_config = AppConfig::load()
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let accounts = if app_config.seed_demo_account {
        InMemoryAccounts::with_demo_account().map_err(std::io::Error::other)?
    } else {
        info!("starting with an empty account store");
        InMemoryAccounts::new()
    };

    let bind_addr = app_config.bind_addr()?;
    let config = ServerConfig::new(session, &app_config, bind_addr, Arc::new(accounts));
    create_server(config)?.await
}
