//! Server-Sent Events stream of the viewer's filtered menu.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Extension, Router};
use futures_core::Stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::session::{SessionSnapshot, SessionState};
use crate::state::AppState;

/// GET /api/menu/events
///
/// Emits a `menu` event with the filtered menu on connect, then again each
/// time the viewer's role changes. The stream owns its own [`SessionState`];
/// role changes for other users are ignored.
async fn menu_events(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let identity = snapshot.identity().cloned().ok_or(AppError::Unauthorized)?;
    let user_id = identity.user_id;

    let owner = SessionState::new();
    owner.restore_completed(Ok(Some(identity)));
    let mut snapshots = owner.subscribe();
    let mut changes = state.roles().subscribe();

    let stream = async_stream::stream! {
        owner.resolve_role(state.roles()).await;

        loop {
            let menus = {
                let current = snapshots.borrow_and_update();
                state.menus().visible_to(current.page_access())
            };
            yield Event::default().event("menu").json_data(&menus);

            // Wait until the published snapshot changes.
            loop {
                tokio::select! {
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        break;
                    }
                    change = changes.recv() => match change {
                        Ok(change) if change.user_id == user_id => {
                            owner.resolve_role(state.roles()).await;
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(user_id = %user_id, skipped, "role change stream lagged");
                            owner.resolve_role(state.roles()).await;
                        }
                        Err(RecvError::Closed) => return,
                    },
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Create the menu events router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/menu/events", get(menu_events))
}
