//! Role resolution service with DashMap-based caching.
//!
//! Resolution is fail-closed: a missing assignment, a disabled role, or a
//! store error all resolve to "no role", never to a permissive default.

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::models::{Role, UserWithRole};
use crate::store::RoleStore;

/// Capacity of the role change channel before slow subscribers lag.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A user's role assignment changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    pub user_id: Uuid,
}

/// Role resolution and administration.
#[derive(Clone)]
pub struct RoleService {
    inner: Arc<RoleServiceInner>,
}

struct RoleServiceInner {
    /// Backing role store.
    store: Arc<dyn RoleStore>,

    /// Cache of user_id -> resolved role (`None` = no usable role).
    user_cache: DashMap<Uuid, Option<Role>>,

    /// Bumped on every invalidation. A lookup only fills the cache if the
    /// user's generation is unchanged since it started.
    generations: DashMap<Uuid, u64>,

    /// Role assignment change notifications.
    changes: broadcast::Sender<RoleChange>,

    metrics: Arc<Metrics>,
}

impl RoleService {
    /// Create a new role service.
    pub fn new(store: Arc<dyn RoleStore>, metrics: Arc<Metrics>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RoleServiceInner {
                store,
                user_cache: DashMap::new(),
                generations: DashMap::new(),
                changes,
                metrics,
            }),
        }
    }

    /// Resolve the usable role for a user.
    ///
    /// Disabled roles and lookup failures resolve to `None`. Failures are not
    /// cached so the next request retries.
    pub async fn resolve_for_user(&self, user_id: Uuid) -> Option<Role> {
        if let Some(cached) = self.inner.user_cache.get(&user_id) {
            self.inner.metrics.role_cache_hits.inc();
            return cached.clone();
        }
        self.inner.metrics.role_cache_misses.inc();

        let generation = self.generation(user_id);
        let resolved = match self.inner.store.find_role_for_user(user_id).await {
            Ok(Some(role)) if role.is_active => Some(role),
            Ok(Some(role)) => {
                info!(user_id = %user_id, role = %role.id, "assigned role is disabled");
                None
            }
            Ok(None) => {
                debug!(user_id = %user_id, "no role assigned");
                None
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "role resolution failed");
                self.inner.metrics.role_resolution_failures.inc();
                return None;
            }
        };

        // The generation entry stays locked while caching, so an invalidation
        // either lands before the check or removes the entry afterwards.
        let current = self.inner.generations.entry(user_id).or_insert(0);
        if *current == generation {
            self.inner.user_cache.insert(user_id, resolved.clone());
        } else {
            debug!(user_id = %user_id, "role changed during lookup; not caching");
        }
        drop(current);

        resolved
    }

    fn generation(&self, user_id: Uuid) -> u64 {
        self.inner
            .generations
            .get(&user_id)
            .map(|g| *g)
            .unwrap_or(0)
    }

    /// Subscribe to role assignment changes.
    pub fn subscribe(&self) -> broadcast::Receiver<RoleChange> {
        self.inner.changes.subscribe()
    }

    /// List roles ordered by name.
    pub async fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>> {
        self.inner.store.list_roles(include_inactive).await
    }

    pub async fn find_role(&self, role_id: &str) -> Result<Option<Role>> {
        self.inner.store.find_role(role_id).await
    }

    pub async fn users_with_role(&self, role_id: &str) -> Result<Vec<UserWithRole>> {
        self.inner.store.users_with_role(role_id).await
    }

    pub async fn list_users_with_roles(&self) -> Result<Vec<UserWithRole>> {
        self.inner.store.list_users_with_roles().await
    }

    /// Assign a role and notify subscribers.
    pub async fn assign_role(&self, user_id: Uuid, role_id: &str) -> Result<Option<UserWithRole>> {
        let updated = self.inner.store.assign_role(user_id, role_id).await?;
        if updated.is_some() {
            info!(user_id = %user_id, role = %role_id, "role assigned");
            self.changed(user_id);
        }
        Ok(updated)
    }

    /// Remove a user's role and notify subscribers.
    pub async fn remove_role(&self, user_id: Uuid) -> Result<Option<UserWithRole>> {
        let updated = self.inner.store.remove_role(user_id).await?;
        if updated.is_some() {
            info!(user_id = %user_id, "role removed");
            self.changed(user_id);
        }
        Ok(updated)
    }

    /// Invalidate the cache for a specific user.
    ///
    /// Call this when a user's role changes outside this service, or on
    /// sign-in and logout. Lookups already in flight will not cache their
    /// result.
    pub fn invalidate_user(&self, user_id: Uuid) {
        *self.inner.generations.entry(user_id).or_insert(0) += 1;
        self.inner.user_cache.remove(&user_id);
    }

    fn changed(&self, user_id: Uuid) {
        self.invalidate_user(user_id);
        // No subscribers is fine.
        let _ = self.inner.changes.send(RoleChange { user_id });
    }
}
