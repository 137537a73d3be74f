//! Authentication routes (login, logout).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info};

use crate::models::User;
use crate::routes::helpers::render;
use crate::session::{self, SESSION_USER_ID, SessionSnapshot};
use crate::state::AppState;
use crate::theme::PageChrome;

/// Query string of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

/// Form-based login request.
#[derive(Debug, Deserialize)]
pub struct LoginFormRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub from: Option<String>,
}

/// Typed login error for explicit status code mapping.
#[derive(Debug)]
enum LoginError {
    /// Unknown email, wrong password, or blocked account (401).
    InvalidCredentials,
    /// Directory or session failure (500).
    Internal,
}

impl LoginError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LoginError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            LoginError::InvalidCredentials => "Invalid email or password",
            LoginError::Internal => "Internal server error",
        }
    }
}

/// GET /auth
async fn auth_index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.routes().login_path)
}

/// GET /auth/login
///
/// Signed-in users go straight to where they were headed.
async fn login_form(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    Query(query): Query<LoginQuery>,
) -> Response {
    if snapshot.is_signed_in() {
        return Redirect::to(&state.routes().post_login_target(query.from.as_deref()))
            .into_response();
    }
    render_login(&state, query.from.as_deref(), "", None)
}

/// POST /auth/login
async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginFormRequest>,
) -> Response {
    match do_login(&state, &session, &form).await {
        Ok(()) => {
            Redirect::to(&state.routes().post_login_target(form.from.as_deref())).into_response()
        }
        Err(e) => {
            let mut response =
                render_login(&state, form.from.as_deref(), &form.email, Some(e.message()));
            *response.status_mut() = e.status_code();
            response
        }
    }
}

fn render_login(state: &AppState, from: Option<&str>, email: &str, error: Option<&str>) -> Response {
    let mut context = tera::Context::new();
    context.insert("from", from.unwrap_or_default());
    context.insert("email", email);
    context.insert("error", &error);
    render(state, "login.html", &PageChrome::default(), context)
}

/// Check credentials and start a fresh session.
async fn do_login(
    state: &AppState,
    session: &Session,
    form: &LoginFormRequest,
) -> Result<(), LoginError> {
    let user = match state.users().find_user_by_email(form.email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(failed(state)),
        Err(e) => {
            error!(error = %e, "directory error during login");
            return Err(LoginError::Internal);
        }
    };

    if !user.is_active || !user.verify_password(&form.password) {
        return Err(failed(state));
    }

    setup_session(session, &user).await?;

    // Resolve the role afresh for the new session.
    state.roles().invalidate_user(user.id);

    info!(user_id = %user.id, "user logged in");
    Ok(())
}

fn failed(state: &AppState) -> LoginError {
    state.metrics().login_failures.inc();
    LoginError::InvalidCredentials
}

async fn setup_session(session: &Session, user: &User) -> Result<(), LoginError> {
    // New id on privilege change; drops notices from the previous identity.
    session.cycle_id().await.map_err(|e| {
        error!(error = %e, "failed to cycle session id");
        LoginError::Internal
    })?;
    session.clear().await;

    session.insert(SESSION_USER_ID, user.id).await.map_err(|e| {
        error!(error = %e, "failed to insert user_id into session");
        LoginError::Internal
    })
}

/// POST /auth/logout
async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user_id)) = session::current_user_id(&session).await {
        state.roles().invalidate_user(user_id);
        info!(user_id = %user_id, "user logged out");
    }

    if let Err(e) = session.delete().await {
        error!(error = %e, "failed to delete session");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Redirect::to(&state.routes().login_path).into_response()
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth_index))
        .route("/auth/login", get(login_form).post(login_submit))
        .route("/auth/logout", post(logout))
}
