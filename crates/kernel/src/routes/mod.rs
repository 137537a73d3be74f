//! HTTP route handlers.

pub mod admin;
pub mod api;
pub mod auth;
pub mod events;
pub mod health;
pub mod helpers;
pub mod metrics;
pub mod pages;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::warn;

use crate::middleware::{load_session, route_guard};
use crate::state::AppState;

/// Build the application router.
///
/// Layers, outermost first: trace, CORS, session, session restore. Private
/// pages additionally pass through the route guard.
pub fn build_app<S>(
    state: AppState,
    session_layer: SessionManagerLayer<S>,
    cors: CorsLayer,
) -> Router
where
    S: SessionStore + Clone,
{
    let private = pages::private_router().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        route_guard,
    ));

    Router::new()
        .merge(pages::router())
        .merge(private)
        .merge(auth::router())
        .merge(api::router())
        .merge(events::router())
        .merge(admin::router())
        .merge(health::router())
        .merge(metrics::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            load_session,
        ))
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer from allowed origins.
///
/// `*` allows any origin without credentials; explicit origins may send
/// the session cookie.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if allowed_origins.len() == 1 && allowed_origins[0] == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
