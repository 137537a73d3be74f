//! In-process directory.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Role, User, UserWithRole};

use super::{RoleStore, UserStore};

/// Seed document for a [`MemoryDirectory`].
///
/// ```yaml
/// roles:
///   - id: editor
///     name: Editor
///     page_access: [dashboard.home, dashboard.analytics]
/// users:
///   - email: kim@example.com
///     display_name: Kim
///     pass: "$argon2id$..."
///     role: editor
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// A seeded user and the id of the role assigned to them.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<Uuid, User>,
    roles: BTreeMap<String, Role>,
    assignments: HashMap<Uuid, String>,
}

impl Directory {
    fn user_with_role(&self, user: &User) -> UserWithRole {
        let role_id = self.assignments.get(&user.id).cloned();
        let page_access = role_id
            .as_ref()
            .and_then(|id| self.roles.get(id))
            .map(|role| role.page_access.clone())
            .unwrap_or_default();

        UserWithRole {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            is_active: user.is_active,
            role_id,
            page_access,
        }
    }

    fn sorted_users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }
}

/// Users, roles, and assignments held in memory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    inner: RwLock<Directory>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a seed document.
    ///
    /// Assignments naming an unknown role are dropped with a warning.
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let directory = Self::new();
        for role in seed.roles {
            directory.insert_role(role);
        }
        for SeedUser { user, role } in seed.users {
            let user_id = user.id;
            directory.insert_user(user);
            if let Some(role_id) = role
                && !directory.assign(user_id, &role_id)
            {
                warn!(user_id = %user_id, role = %role_id, "seed assigns unknown role");
            }
        }
        directory
    }

    /// Load a YAML seed file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let seed: DirectorySeed = serde_yml::from_str(&yaml)
            .with_context(|| format!("failed to parse seed file {}", path.display()))?;

        let (users, roles) = (seed.users.len(), seed.roles.len());
        let directory = Self::from_seed(seed);
        info!(path = %path.display(), users, roles, "loaded directory seed");
        Ok(directory)
    }

    pub fn insert_user(&self, user: User) {
        self.inner.write().users.insert(user.id, user);
    }

    pub fn insert_role(&self, role: Role) {
        self.inner.write().roles.insert(role.id.clone(), role);
    }

    /// Assign a role directly. Returns false when the user or role is unknown.
    pub fn assign(&self, user_id: Uuid, role_id: &str) -> bool {
        let mut inner = self.inner.write();
        if !inner.users.contains_key(&user_id) || !inner.roles.contains_key(role_id) {
            return false;
        }
        inner.assignments.insert(user_id, role_id.to_string());
        true
    }
}

#[async_trait]
impl UserStore for MemoryDirectory {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl RoleStore for MemoryDirectory {
    async fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .inner
            .read()
            .roles
            .values()
            .filter(|r| include_inactive || r.is_active)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_role(&self, role_id: &str) -> Result<Option<Role>> {
        Ok(self.inner.read().roles.get(role_id).cloned())
    }

    async fn find_role_for_user(&self, user_id: Uuid) -> Result<Option<Role>> {
        let inner = self.inner.read();
        Ok(inner
            .assignments
            .get(&user_id)
            .and_then(|role_id| inner.roles.get(role_id))
            .cloned())
    }

    async fn users_with_role(&self, role_id: &str) -> Result<Vec<UserWithRole>> {
        let inner = self.inner.read();
        Ok(inner
            .sorted_users()
            .into_iter()
            .filter(|u| inner.assignments.get(&u.id).map(String::as_str) == Some(role_id))
            .map(|u| inner.user_with_role(u))
            .collect())
    }

    async fn list_users_with_roles(&self) -> Result<Vec<UserWithRole>> {
        let inner = self.inner.read();
        Ok(inner
            .sorted_users()
            .into_iter()
            .map(|u| inner.user_with_role(u))
            .collect())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: &str) -> Result<Option<UserWithRole>> {
        if !self.assign(user_id, role_id) {
            return Ok(None);
        }
        let inner = self.inner.read();
        Ok(inner.users.get(&user_id).map(|u| inner.user_with_role(u)))
    }

    async fn remove_role(&self, user_id: Uuid) -> Result<Option<UserWithRole>> {
        let mut inner = self.inner.write();
        if !inner.users.contains_key(&user_id) {
            return Ok(None);
        }
        inner.assignments.remove(&user_id);
        Ok(inner.users.get(&user_id).map(|u| inner.user_with_role(u)))
    }
}
