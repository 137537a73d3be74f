//! PostgreSQL directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Role, User, UserWithRole};

use super::{RoleStore, UserStore};

/// Directory schema, applied idempotently at startup.
const SCHEMA: &str = include_str!("../../migrations/0001_directory.sql");

const USER_WITH_ROLE_SELECT: &str = r#"
    SELECT u.id, u.email, u.display_name, u.is_active,
           ur.role_id,
           COALESCE(r.page_access, '{}'::TEXT[]) AS page_access
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

/// Directory backed by the `users`, `roles`, and `user_roles` tables.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the directory tables if they do not exist.
    pub async fn apply_schema(&self) -> Result<()> {
        // raw_sql: the schema file holds several statements.
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .context("failed to apply directory schema")?;
        Ok(())
    }

    async fn user_with_role(&self, user_id: Uuid) -> Result<Option<UserWithRole>> {
        let query = format!("{USER_WITH_ROLE_SELECT} WHERE u.id = $1");
        let user = sqlx::query_as::<_, UserWithRole>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch user with role")?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for PgDirectory {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch user by id")?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch user by email")?;

        Ok(user)
    }
}

#[async_trait]
impl RoleStore for PgDirectory {
    async fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE is_active OR $1 ORDER BY name",
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .context("failed to list roles")?;

        Ok(roles)
    }

    async fn find_role(&self, role_id: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch role by id")?;

        Ok(role)
    }

    async fn find_role_for_user(&self, user_id: Uuid) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.* FROM roles r
            JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch role for user")?;

        Ok(role)
    }

    async fn users_with_role(&self, role_id: &str) -> Result<Vec<UserWithRole>> {
        let query = format!("{USER_WITH_ROLE_SELECT} WHERE ur.role_id = $1 ORDER BY u.email");
        let users = sqlx::query_as::<_, UserWithRole>(&query)
            .bind(role_id)
            .fetch_all(&self.pool)
            .await
            .context("failed to list users with role")?;

        Ok(users)
    }

    async fn list_users_with_roles(&self) -> Result<Vec<UserWithRole>> {
        let query = format!("{USER_WITH_ROLE_SELECT} ORDER BY u.email");
        let users = sqlx::query_as::<_, UserWithRole>(&query)
            .fetch_all(&self.pool)
            .await
            .context("failed to list users")?;

        Ok(users)
    }

    async fn assign_role(&self, user_id: Uuid, role_id: &str) -> Result<Option<UserWithRole>> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT u.id, r.id FROM users u, roles r
            WHERE u.id = $1 AND r.id = $2
            ON CONFLICT (user_id) DO UPDATE SET role_id = EXCLUDED.role_id
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .context("failed to assign role to user")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.user_with_role(user_id).await
    }

    async fn remove_role(&self, user_id: Uuid) -> Result<Option<UserWithRole>> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("failed to remove role from user")?;

        self.user_with_role(user_id).await
    }
}
