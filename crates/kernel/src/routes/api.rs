//! JSON API for client-side navigation.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::access::path_to_access_key;
use crate::error::{AppError, AppResult};
use crate::guard::{GuardOutcome, GuardState, Notice};
use crate::menu::MenuNode;
use crate::session::{self, Identity, SessionPhase, SessionSnapshot};
use crate::state::AppState;

/// Role summary exposed to the signed-in user.
#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub page_access: Vec<String>,
}

/// Current session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phase: &'static str,
    pub identity: Option<Identity>,
    pub role: Option<RoleSummary>,
}

impl From<&SessionSnapshot> for SessionResponse {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let phase = match snapshot.phase {
            SessionPhase::Initializing => "initializing",
            SessionPhase::SignedOut => "signed_out",
            SessionPhase::SignedIn(_) => "signed_in",
        };
        Self {
            phase,
            identity: snapshot.identity().cloned(),
            role: snapshot.role.as_ref().map(|role| RoleSummary {
                id: role.id.clone(),
                name: role.display_name().to_string(),
                page_access: role.page_access.clone(),
            }),
        }
    }
}

/// GET /api/session
async fn current_session(Extension(snapshot): Extension<SessionSnapshot>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&snapshot))
}

/// GET /api/menu
async fn menu(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
) -> AppResult<Json<Vec<MenuNode>>> {
    if !snapshot.is_signed_in() {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(state.menus().visible_to(snapshot.page_access())))
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub path: String,
}

/// Guard decision for a path.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub path: String,
    pub access_key: String,
    /// The page would render.
    pub allowed: bool,
    pub decision: GuardState,
    /// Where the navigation would be sent instead, if anywhere.
    pub redirect: Option<String>,
}

/// GET /api/access?path=
///
/// Evaluates without recording a denial.
async fn check_access(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    Query(query): Query<AccessQuery>,
) -> Json<AccessResponse> {
    let decision = GuardState::evaluate(&snapshot, &query.path);
    let redirect = match decision.outcome(state.routes()) {
        GuardOutcome::Redirect { location } => Some(location),
        GuardOutcome::Render | GuardOutcome::Pending => None,
    };

    Json(AccessResponse {
        access_key: path_to_access_key(&query.path),
        allowed: decision.is_allowed(),
        path: query.path,
        decision,
        redirect,
    })
}

/// A queued notice with its display text.
#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    #[serde(flatten)]
    pub notice: Notice,
    pub message: String,
}

/// GET /api/notices
///
/// Each notice is returned once.
async fn notices(session: Session) -> AppResult<Json<Vec<NoticeResponse>>> {
    let notices = session::take_notices(&session).await?;
    Ok(Json(
        notices
            .into_iter()
            .map(|notice| NoticeResponse {
                message: notice.message(),
                notice,
            })
            .collect(),
    ))
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(current_session))
        .route("/api/menu", get(menu))
        .route("/api/access", get(check_access))
        .route("/api/notices", get(notices))
}
