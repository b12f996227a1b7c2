//! Provision an administrator account.
//!
//! Reads `ADMIN_USERNAME` (default `admin`) and `ADMIN_PASSWORD`, and the
//! database location from the usual `LIBRARY_*` settings. Applies pending
//! migrations first so it can run against a fresh database.

use std::env;

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use resource_library::domain::ports::UserRepository;
use resource_library::domain::{CredentialHasher, NewUser, Username};
use resource_library::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use resource_library::settings::LibrarySettings;

const DEFAULT_USERNAME: &str = "admin";
const DEV_PASSWORD: &str = "drowssap1234k";

fn admin_password() -> Result<Zeroizing<String>> {
    match env::var("ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => Ok(Zeroizing::new(password)),
        _ if cfg!(debug_assertions) => {
            warn!("ADMIN_PASSWORD unset; using the development default");
            Ok(Zeroizing::new(DEV_PASSWORD.to_owned()))
        }
        _ => Err(eyre!("ADMIN_PASSWORD must be set")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = LibrarySettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;
    let url = settings
        .database_url()
        .ok_or_else(|| eyre!("LIBRARY_DATABASE_URL must be set"))?;
    let username = Username::new(
        env::var("ADMIN_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_owned()),
    )?;
    let password = admin_password()?;

    run_pending_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(1)).await?;
    let users = DieselUserRepository::new(pool);

    let hasher = CredentialHasher::default();
    let credential = tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
        .await
        .wrap_err("password hashing task failed")??;

    let admin = users
        .create(NewUser {
            username,
            credential,
            is_admin: true,
        })
        .await?;
    info!(user_id = %admin.id(), username = %admin.username(), "administrator created");
    Ok(())
}
