//! Landing and private pages.

use axum::extract::State;
use axum::http::Uri;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Router};
use tower_sessions::Session;

use crate::error::AppError;
use crate::routes::helpers::{page_chrome, render};
use crate::session::SessionSnapshot;
use crate::state::AppState;

/// GET /
async fn landing(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    session: Session,
) -> Response {
    if !snapshot.is_signed_in() {
        return Redirect::to(&state.routes().login_path).into_response();
    }

    let chrome = page_chrome(&state, &snapshot, &session, "/").await;
    let mut context = tera::Context::new();
    context.insert("no_role", &snapshot.role.is_none());
    render(&state, "landing.html", &chrome, context)
}

/// A private page backed by a menu entry.
///
/// Reached only after the route guard allowed the navigation.
async fn private_page(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    session: Session,
    uri: Uri,
) -> Result<Response, AppError> {
    let path = uri.path();
    let title = state
        .menus()
        .find_by_path(path)
        .map(|node| node.title.clone())
        .ok_or(AppError::NotFound)?;

    let chrome = page_chrome(&state, &snapshot, &session, path).await;
    let mut context = tera::Context::new();
    context.insert("title", &title);
    context.insert("path", path);
    Ok(render(&state, "page.html", &chrome, context))
}

/// Public routes: the landing page and section index redirects.
///
/// Section indexes only redirect, so they sit outside the guard.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/dashboard", get(|| async { Redirect::to("/dashboard/home") }))
        .route("/admin", get(|| async { Redirect::to("/admin/users") }))
}

/// Guarded routes: every page under a menu section.
pub fn private_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/{*rest}", get(private_page))
        .route("/admin/{*rest}", get(private_page))
}
