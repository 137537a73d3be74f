//! Role model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::matches_pattern;

/// Role record.
///
/// `page_access` holds the access patterns the role grants. It may be empty,
/// in which case the role can open no guarded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub page_access: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub changed: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Role {
    /// Create an active role granting the given patterns.
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, page_access: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            display_name: None,
            description: None,
            page_access: page_access.into_iter().map(Into::into).collect(),
            is_active: true,
            created: now,
            changed: now,
        }
    }

    /// Name shown to operators, falling back to `name`.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether this role grants the given access key.
    pub fn grants(&self, access_key: &str) -> bool {
        matches_pattern(access_key, &self.page_access)
    }
}
