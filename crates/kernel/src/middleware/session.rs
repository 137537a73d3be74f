//! Per-request session restore.
//!
//! Restores the identity stored in the HTTP session, resolves its role, and
//! makes the resulting [`SessionSnapshot`] available to handlers as a request
//! extension.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use tracing::debug;

use crate::session::{self, Identity, SessionSnapshot, SessionState};
use crate::state::AppState;

/// Middleware that attaches the current [`SessionSnapshot`] to the request.
pub async fn load_session(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let snapshot = restore_snapshot(&state, &session).await;
    request.extensions_mut().insert(snapshot);
    next.run(request).await
}

/// Restore a session and resolve its role.
///
/// Any failure along the way leaves the session signed out or without a
/// role; it never grants access.
pub async fn restore_snapshot(state: &AppState, session: &Session) -> SessionSnapshot {
    let owner = SessionState::new();
    owner.restore_completed(restore_identity(state, session).await);
    owner.resolve_role(state.roles()).await;
    owner.snapshot()
}

async fn restore_identity(state: &AppState, session: &Session) -> Result<Option<Identity>> {
    let Some(user_id) = session::current_user_id(session).await? else {
        return Ok(None);
    };

    let user = state.users().find_user_by_id(user_id).await?;
    match user {
        Some(user) if user.is_active => Ok(Some(user.identity())),
        Some(_) => {
            debug!(user_id = %user_id, "session belongs to a blocked user");
            Ok(None)
        }
        None => {
            debug!(user_id = %user_id, "session user no longer exists");
            Ok(None)
        }
    }
}
