//! Route guard middleware for private pages.

use axum::{
    Extension,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, info, warn};

use crate::guard::{GuardOutcome, GuardState};
use crate::session::{self, SessionSnapshot};
use crate::state::AppState;

/// Evaluate the guard for every navigation to a private page.
///
/// Allowed navigations render; everything else is redirected. A denial queues
/// one access denied notice per denied path.
pub async fn route_guard(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let decision = GuardState::evaluate(&snapshot, &path);
    state.metrics().record_guard(decision.label());
    debug!(path = %path, state = decision.label(), "route guard");

    if snapshot.is_signed_in() {
        let mut notifier = session::load_notifier(&session).await;
        let before = notifier.clone();

        if let Some(notice) = notifier.observe(&decision, &path) {
            info!(path = %path, "access denied");
            state.metrics().denial_notices.inc();
            if let Err(e) = session::push_notice(&session, notice).await {
                warn!(error = %e, "failed to queue access denied notice");
            }
        }

        if notifier != before
            && let Err(e) = session::store_notifier(&session, &notifier).await
        {
            warn!(error = %e, "failed to store denial notifier");
        }
    }

    match decision.outcome(state.routes()) {
        GuardOutcome::Render => next.run(request).await,
        GuardOutcome::Redirect { location } => Redirect::to(&location).into_response(),
        GuardOutcome::Pending => {
            (StatusCode::SERVICE_UNAVAILABLE, [(header::RETRY_AFTER, "1")]).into_response()
        }
    }
}
