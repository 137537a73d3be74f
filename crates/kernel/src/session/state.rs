//! Session state owner.
//!
//! A [`SessionState`] is the single writer of one session's identity and
//! resolved role. Readers take a [`SessionSnapshot`] or subscribe to changes;
//! the guard and menu filter only ever see snapshots.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Role;
use crate::roles::RoleService;

/// Who the identity provider says is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Authentication phase of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Session restore has not reported back yet.
    Initializing,
    SignedOut,
    SignedIn(Identity),
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Resolved role. Always `None` unless signed in.
    pub role: Option<Role>,
}

impl SessionSnapshot {
    pub fn initializing() -> Self {
        Self {
            phase: SessionPhase::Initializing,
            role: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            phase: SessionPhase::SignedOut,
            role: None,
        }
    }

    pub fn signed_in(identity: Identity, role: Option<Role>) -> Self {
        Self {
            phase: SessionPhase::SignedIn(identity),
            role,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.phase {
            SessionPhase::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.phase, SessionPhase::SignedIn(_))
    }

    /// Patterns granted to this session; empty without a resolved role.
    pub fn page_access(&self) -> &[String] {
        match (&self.phase, &self.role) {
            (SessionPhase::SignedIn(_), Some(role)) => &role.page_access,
            _ => &[],
        }
    }
}

/// Owner of one session's state.
#[derive(Debug)]
pub struct SessionState {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionState {
    /// A session waiting for restore to complete.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::initializing());
        Self { tx }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Report the outcome of session restore.
    ///
    /// Only the first report leaves `Initializing`; later ones are ignored
    /// and return `false`. A failed restore signs the session out.
    pub fn restore_completed(&self, restored: Result<Option<Identity>>) -> bool {
        self.tx.send_if_modified(|current| {
            if current.phase != SessionPhase::Initializing {
                debug!("session restore already completed");
                return false;
            }
            *current = match restored {
                Ok(Some(identity)) => SessionSnapshot::signed_in(identity, None),
                Ok(None) => SessionSnapshot::signed_out(),
                Err(e) => {
                    warn!(error = %e, "session restore failed");
                    SessionSnapshot::signed_out()
                }
            };
            true
        })
    }

    /// Sign in with no role until [`resolve_role`](Self::resolve_role) runs.
    pub fn sign_in(&self, identity: Identity) {
        self.tx.send_replace(SessionSnapshot::signed_in(identity, None));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(SessionSnapshot::signed_out());
    }

    /// Resolve the role of the signed-in identity and publish it.
    ///
    /// Returns `true` when the published snapshot changed. A resolution that
    /// finishes after the identity changed is dropped.
    pub async fn resolve_role(&self, roles: &RoleService) -> bool {
        let Some(user_id) = self.snapshot().identity().map(|i| i.user_id) else {
            return false;
        };

        let role = roles.resolve_for_user(user_id).await;

        self.tx.send_if_modified(|current| match &current.phase {
            SessionPhase::SignedIn(identity) if identity.user_id == user_id => {
                if current.role == role {
                    return false;
                }
                current.role = role;
                true
            }
            _ => {
                debug!(user_id = %user_id, "discarding stale role resolution");
                false
            }
        })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
