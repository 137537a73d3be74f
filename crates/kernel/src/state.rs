//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::guard::GuardRoutes;
use crate::menu::MenuCatalog;
use crate::metrics::Metrics;
use crate::roles::RoleService;
use crate::store::{MemoryDirectory, PgDirectory, RoleStore, UserStore};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool, when the directory lives in PostgreSQL.
    db: Option<PgPool>,

    /// Sign-in identity lookup.
    users: Arc<dyn UserStore>,

    /// Role resolution and administration.
    roles: RoleService,

    /// Menus every role is filtered against.
    menus: Arc<MenuCatalog>,

    /// Guard redirect targets.
    routes: GuardRoutes,

    /// Theme engine for template rendering.
    theme: Arc<ThemeEngine>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state, connecting to configured storage.
    pub async fn new(config: &Config) -> Result<Self> {
        let metrics = Arc::new(Metrics::new());

        let (db, users, roles): (Option<PgPool>, Arc<dyn UserStore>, Arc<dyn RoleStore>) =
            match &config.database_url {
                Some(url) => {
                    let pool = db::create_pool(url, config.database_max_connections).await?;
                    let directory = Arc::new(PgDirectory::new(pool.clone()));
                    directory.apply_schema().await?;
                    info!("connected to PostgreSQL directory");
                    (
                        Some(pool),
                        directory.clone() as Arc<dyn UserStore>,
                        directory as Arc<dyn RoleStore>,
                    )
                }
                None => {
                    let directory = match &config.seed_file {
                        Some(path) => Arc::new(MemoryDirectory::from_yaml_file(path)?),
                        None => {
                            warn!("no DATABASE_URL or SEED_FILE; directory is empty");
                            Arc::new(MemoryDirectory::new())
                        }
                    };
                    (
                        None,
                        directory.clone() as Arc<dyn UserStore>,
                        directory as Arc<dyn RoleStore>,
                    )
                }
            };

        let mut menus = MenuCatalog::builtin();
        if let Some(path) = &config.menu_file {
            match menus.extend_from_file(path) {
                Ok(added) => info!(path = %path.display(), added, "loaded extra menus"),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping menu file"),
            }
        }

        let theme = ThemeEngine::new().context("failed to load templates")?;

        Ok(Self::from_parts(
            db,
            users,
            RoleService::new(roles, metrics.clone()),
            menus,
            config.guard_routes(),
            theme,
            metrics,
        ))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        db: Option<PgPool>,
        users: Arc<dyn UserStore>,
        roles: RoleService,
        menus: MenuCatalog,
        routes: GuardRoutes,
        theme: ThemeEngine,
        metrics: Arc<Metrics>,
    ) -> Self {
        info!(menus = menus.len(), "application state ready");
        Self {
            inner: Arc::new(AppStateInner {
                db,
                users,
                roles,
                menus: Arc::new(menus),
                routes,
                theme: Arc::new(theme),
                metrics,
            }),
        }
    }

    /// In-memory state over a directory, for tests and local tools.
    pub fn in_memory(directory: Arc<MemoryDirectory>, menus: MenuCatalog) -> Result<Self> {
        let metrics = Arc::new(Metrics::new());
        Ok(Self::from_parts(
            None,
            directory.clone(),
            RoleService::new(directory, metrics.clone()),
            menus,
            GuardRoutes::default(),
            ThemeEngine::new()?,
            metrics,
        ))
    }

    pub fn db(&self) -> Option<&PgPool> {
        self.inner.db.as_ref()
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.inner.users
    }

    pub fn roles(&self) -> &RoleService {
        &self.inner.roles
    }

    pub fn menus(&self) -> &Arc<MenuCatalog> {
        &self.inner.menus
    }

    pub fn routes(&self) -> &GuardRoutes {
        &self.inner.routes
    }

    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Check storage health. The in-memory directory is always healthy.
    pub async fn storage_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => true,
        }
    }
}
