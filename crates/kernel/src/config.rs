//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::guard::GuardRoutes;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When unset, the directory lives in memory.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Redis connection URL. When unset, sessions live in memory.
    pub redis_url: Option<String>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "strict").
    pub cookie_same_site: String,

    /// Mark session cookies Secure (default: true).
    pub secure_cookies: bool,

    /// Session inactivity expiry in hours (default: 24).
    pub session_expiry_hours: i64,

    /// YAML directory seed for the in-memory directory.
    pub seed_file: Option<PathBuf>,

    /// JSON file with extra menu definitions.
    pub menu_file: Option<PathBuf>,

    /// Safe landing location for denied navigations (default: "/").
    pub default_landing: String,

    /// Login page (default: "/auth/login").
    pub login_path: String,
}

impl Default for Config {
    fn default() -> Self {
        let routes = GuardRoutes::default();
        Self {
            port: 3000,
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            cors_allowed_origins: vec!["*".to_string()],
            cookie_same_site: "strict".to_string(),
            secure_cookies: true,
            session_expiry_hours: 24,
            seed_file: None,
            menu_file: None,
            default_landing: routes.default_landing,
            login_path: routes.login_path,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = env::var("PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = non_empty("DATABASE_URL");

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| defaults.database_max_connections.to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let redis_url = non_empty("REDIS_URL");

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or(defaults.cors_allowed_origins);

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or(defaults.cookie_same_site)
            .to_lowercase();

        let secure_cookies = env::var("SECURE_COOKIES")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(defaults.secure_cookies);

        let session_expiry_hours = env::var("SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|_| defaults.session_expiry_hours.to_string())
            .parse()
            .context("SESSION_EXPIRY_HOURS must be a valid integer")?;

        let seed_file = non_empty("SEED_FILE").map(PathBuf::from);
        let menu_file = non_empty("MENU_FILE").map(PathBuf::from);

        let default_landing = env::var("DEFAULT_LANDING").unwrap_or(defaults.default_landing);
        if !default_landing.starts_with('/') {
            anyhow::bail!("DEFAULT_LANDING must be a local path starting with '/'");
        }

        let login_path = env::var("LOGIN_PATH").unwrap_or(defaults.login_path);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            redis_url,
            cors_allowed_origins,
            cookie_same_site,
            secure_cookies,
            session_expiry_hours,
            seed_file,
            menu_file,
            default_landing,
            login_path,
        })
    }

    /// Redirect targets for the route guard.
    pub fn guard_routes(&self) -> GuardRoutes {
        GuardRoutes {
            login_path: self.login_path.clone(),
            default_landing: self.default_landing.clone(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
