//! Yard service entry-point: loads settings, prepares storage, and serves the
//! REST API alongside the anomaly monitor.

mod server;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use yardline::config::AppSettings;
use yardline::inbound::http::health::HealthState;
use yardline::outbound::persistence::{DbPool, PoolConfig, run_migrations};

fn load_session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let Some(path) = settings.session_key_file.as_ref() else {
        warn!("no session key file configured; using a temporary key");
        return Ok(Key::generate());
    };
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) if cfg!(debug_assertions) => {
            warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(e) => Err(std::io::Error::other(format!(
            "failed to read session key at {}: {e}",
            path.display()
        ))),
    }
}

async fn connect_database(database_url: &str) -> std::io::Result<DbPool> {
    let applied = run_migrations(database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    pool.ping()
        .await
        .map_err(|e| std::io::Error::other(format!("database unreachable: {e}")))?;
    Ok(pool)
}

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

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let key = load_session_key(&settings)?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let database_url = settings.database_url().map(str::to_owned);

    let mut config = ServerConfig::new(key, SameSite::Lax, bind_addr, settings);
    if let Some(url) = database_url {
        config = config.with_db_pool(connect_database(&url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting yard service");
    let server = create_server(health_state, config).await?;
    server.await
}
