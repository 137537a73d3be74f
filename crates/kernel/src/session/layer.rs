//! Session persistence using Redis, or memory in development.

use anyhow::{Context, Result};
use fred::prelude::*;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_redis_store::RedisStore;

use crate::config::Config;

/// Create the session layer using Redis as the backend.
pub async fn redis_session_layer(
    redis_url: &str,
    config: &Config,
) -> Result<SessionManagerLayer<RedisStore<Pool>>> {
    let redis_config = fred::prelude::Config::from_url(redis_url).context("failed to parse Redis URL")?;

    let pool = Builder::from_config(redis_config)
        .build_pool(1)
        .context("failed to create Redis pool")?;

    pool.init()
        .await
        .context("failed to connect to Redis for sessions")?;

    Ok(configure(SessionManagerLayer::new(RedisStore::new(pool)), config))
}

/// Create a session layer that keeps sessions in process.
///
/// Sessions are lost on restart.
pub fn memory_session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    configure(SessionManagerLayer::new(MemoryStore::default()), config)
}

/// Apply cookie policy and expiry from configuration.
pub fn configure<S: SessionStore>(
    layer: SessionManagerLayer<S>,
    config: &Config,
) -> SessionManagerLayer<S> {
    layer
        .with_secure(config.secure_cookies)
        .with_http_only(true)
        .with_same_site(same_site(&config.cookie_same_site))
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            config.session_expiry_hours,
        )))
}

fn same_site(value: &str) -> SameSite {
    match value {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}
