//! Session state and persistence.

mod layer;
mod state;

use anyhow::Result;
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::guard::{DenialNotifier, Notice};

pub use layer::{configure, memory_session_layer, redis_session_layer};
pub use state::{Identity, SessionPhase, SessionSnapshot, SessionState};

/// Session key for the signed-in user id.
pub const SESSION_USER_ID: &str = "user_id";

/// Session key for the access denied notifier.
pub const SESSION_DENIAL_NOTIFIER: &str = "denial_notifier";

/// Session key for queued notices.
pub const SESSION_NOTICES: &str = "notices";

/// The user id stored in the session, if any.
pub async fn current_user_id(session: &Session) -> Result<Option<Uuid>> {
    Ok(session.get::<Uuid>(SESSION_USER_ID).await?)
}

/// Load the denial notifier, starting fresh when absent or unreadable.
pub async fn load_notifier(session: &Session) -> DenialNotifier {
    match session.get::<DenialNotifier>(SESSION_DENIAL_NOTIFIER).await {
        Ok(notifier) => notifier.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "failed to read denial notifier");
            DenialNotifier::default()
        }
    }
}

pub async fn store_notifier(session: &Session, notifier: &DenialNotifier) -> Result<()> {
    session.insert(SESSION_DENIAL_NOTIFIER, notifier).await?;
    Ok(())
}

/// Queue a notice for the next page that drains them.
pub async fn push_notice(session: &Session, notice: Notice) -> Result<()> {
    let mut notices: Vec<Notice> = session.get(SESSION_NOTICES).await?.unwrap_or_default();
    notices.push(notice);
    session.insert(SESSION_NOTICES, notices).await?;
    Ok(())
}

/// Remove and return all queued notices.
pub async fn take_notices(session: &Session) -> Result<Vec<Notice>> {
    Ok(session
        .remove::<Vec<Notice>>(SESSION_NOTICES)
        .await?
        .unwrap_or_default())
}
