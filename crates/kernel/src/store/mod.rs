//! Directory storage for users, roles, and role assignments.
//!
//! The kernel only consumes these through the [`UserStore`] and
//! [`RoleStore`] traits. [`PgDirectory`] backs them with PostgreSQL;
//! [`MemoryDirectory`] keeps everything in process for development and tests.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Role, User, UserWithRole};

pub use memory::{DirectorySeed, MemoryDirectory};
pub use postgres::PgDirectory;

/// Lookup of sign-in identities.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Email lookup is case-insensitive.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Roles and the user-to-role join.
///
/// A user holds at most one role.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// List roles ordered by name, optionally including disabled ones.
    async fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>>;

    async fn find_role(&self, role_id: &str) -> Result<Option<Role>>;

    /// The role assigned to a user, whether or not it is active.
    async fn find_role_for_user(&self, user_id: Uuid) -> Result<Option<Role>>;

    async fn users_with_role(&self, role_id: &str) -> Result<Vec<UserWithRole>>;

    /// Every user with their assignment, ordered by email.
    async fn list_users_with_roles(&self) -> Result<Vec<UserWithRole>>;

    /// Assign a role, replacing any previous one.
    ///
    /// Returns `None` when the user or the role does not exist.
    async fn assign_role(&self, user_id: Uuid, role_id: &str) -> Result<Option<UserWithRole>>;

    /// Remove a user's role. Returns `None` when the user does not exist.
    async fn remove_role(&self, user_id: Uuid) -> Result<Option<UserWithRole>>;
}
