//! User model and password handling.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Identity;

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    #[serde(default = "Uuid::now_v7")]
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub pass: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// A user together with the role assigned to them, as listed to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserWithRole {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub role_id: Option<String>,
    /// Patterns granted by the assigned role (empty without one).
    pub page_access: Vec<String>,
}

impl User {
    /// Build a new active user, hashing the password.
    pub fn new(email: &str, display_name: &str, password: &str) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            pass: hash_password(password)?,
            is_active: true,
            created: Utc::now(),
        })
    }

    /// Verify a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        if self.pass.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.pass) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// The identity this user signs in as.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
