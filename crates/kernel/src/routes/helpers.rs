//! Shared route helpers for page rendering and API access checks.

use axum::response::{Html, IntoResponse, Response};
use tower_sessions::Session;
use tracing::warn;

use crate::error::AppError;
use crate::menu::NavItem;
use crate::session::{self, Identity, SessionSnapshot};
use crate::state::AppState;
use crate::theme::PageChrome;

/// Require a signed-in session whose role grants `access_key`.
///
/// Returns 401 when signed out and 403 when the role does not match.
pub fn require_access<'a>(
    snapshot: &'a SessionSnapshot,
    access_key: &str,
) -> Result<&'a Identity, AppError> {
    let identity = snapshot.identity().ok_or(AppError::Unauthorized)?;
    match &snapshot.role {
        Some(role) if role.grants(access_key) => Ok(identity),
        _ => Err(AppError::Forbidden),
    }
}

/// Build the page chrome for `current_path`, draining queued notices.
pub async fn page_chrome(
    state: &AppState,
    snapshot: &SessionSnapshot,
    session: &Session,
    current_path: &str,
) -> PageChrome {
    let menus = state.menus().visible_to(snapshot.page_access());

    let notices = match session::take_notices(session).await {
        Ok(notices) => notices.iter().map(|n| n.message()).collect(),
        Err(e) => {
            warn!(error = %e, "failed to read notices");
            Vec::new()
        }
    };

    PageChrome {
        identity: snapshot.identity().cloned(),
        role_name: snapshot.role.as_ref().map(|r| r.display_name().to_string()),
        nav_items: NavItem::build(&menus, current_path),
        notices,
    }
}

/// Render a page template, mapping failures to a 500.
pub fn render(
    state: &AppState,
    template: &str,
    chrome: &PageChrome,
    extra: tera::Context,
) -> Response {
    match state.theme().render_page(template, chrome, extra) {
        Ok(html) => Html(html).into_response(),
        Err(e) => AppError::Internal(e).into_response(),
    }
}
