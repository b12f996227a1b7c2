//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use resource_library::inbound::http::health::HealthState;
use resource_library::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use resource_library::settings::LibrarySettings;

use server::{ServerConfig, Storage, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = LibrarySettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;
    let storage = storage_from(&settings).await?;
    let config = ServerConfig::new(
        settings.bind_addr()?,
        settings.cookie_config()?,
        settings.session_ttl()?,
        storage,
    )
    .with_sweep_interval(settings.session_sweep_interval());

    let health_state = web::Data::new(HealthState::new());
    let (server, sweeper) = create_server(health_state, config).await?;
    let outcome = server.await;
    sweeper.abort();
    outcome.wrap_err("server terminated")
}

async fn storage_from(settings: &LibrarySettings) -> Result<Storage> {
    if settings.in_memory {
        warn!("using in-memory storage; data is lost on restart");
        return Ok(Storage::Memory);
    }
    let Some(url) = settings.database_url() else {
        if cfg!(debug_assertions) {
            warn!("LIBRARY_DATABASE_URL unset; falling back to in-memory storage (dev only)");
            return Ok(Storage::Memory);
        }
        return Err(eyre!(
            "LIBRARY_DATABASE_URL is required (or set LIBRARY_IN_MEMORY=true)"
        ));
    };

    let applied = run_pending_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await?;
    Ok(Storage::Postgres(pool))
}
