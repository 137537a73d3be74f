#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Route guard integration tests.
//!
//! Drives navigations through the real router and checks redirects,
//! rendered pages, and the queued access denied notices.

mod common;

use axum::http::StatusCode;
use common::{TestApp, body_json, body_text, extract_cookies, location};
use pagewarden_kernel::store::UserStore;

// =============================================================================
// Signed out
// =============================================================================

#[tokio::test]
async fn signed_out_navigation_redirects_to_login_with_from() {
    let app = TestApp::new();

    let response = app.get("/dashboard/home", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?from=%2Fdashboard%2Fhome");
}

#[tokio::test]
async fn signed_out_landing_redirects_to_login() {
    let app = TestApp::new();

    let response = app.get("/", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn login_page_keeps_from_in_form() {
    let app = TestApp::new();

    let response = app.get("/auth/login?from=/dashboard/home", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"from\""));
    assert!(body.contains("name=\"email\""));
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn login_returns_to_attempted_path() {
    let app = TestApp::new();
    app.create_user("viewer@example.com", "secret", Some("viewer"))
        .await;

    let response = app
        .submit_login("viewer@example.com", "secret", Some("/dashboard/home"))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/home");

    let cookies = extract_cookies(&response);
    let page = app.get("/dashboard/home", &cookies).await;
    assert_eq!(page.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_ignores_off_site_from() {
    let app = TestApp::new();
    app.create_user("viewer@example.com", "secret", Some("viewer"))
        .await;

    for from in ["//evil.example.com/", "/\\evil.example.com", "https://evil.example.com/"] {
        let response = app
            .submit_login("viewer@example.com", "secret", Some(from))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "from {from:?}");
        assert_eq!(location(&response), "/", "from {from:?}");
    }
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.create_user("viewer@example.com", "secret", Some("viewer"))
        .await;

    let response = app
        .submit_login("viewer@example.com", "not-it", None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_text(response).await;
    assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
async fn unknown_email_is_unauthorized() {
    let app = TestApp::new();

    let response = app.submit_login("nobody@example.com", "secret", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_in_login_page_redirects_to_target() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("viewer@example.com", Some("viewer"))
        .await;

    let response = app
        .get("/auth/login?from=%2Fdashboard%2Fhome", &cookies)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/home");
}

// =============================================================================
// Allowed
// =============================================================================

#[tokio::test]
async fn ancestor_pattern_allows_nested_page() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("analyst@example.com", Some("analyst"))
        .await;

    let response = app.get("/dashboard/analytics/reports", &cookies).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Reports"));
}

#[tokio::test]
async fn sibling_page_is_denied() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("analyst@example.com", Some("analyst"))
        .await;

    let response = app.get("/dashboard/settings", &cookies).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn allowed_path_without_menu_entry_is_not_found() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("admin@example.com", Some("admin"))
        .await;

    let response = app.get("/dashboard/nowhere", &cookies).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn section_index_redirects_to_first_page() {
    let app = TestApp::new();

    let dashboard = app.get("/dashboard", "").await;
    assert_eq!(location(&dashboard), "/dashboard/home");

    let admin = app.get("/admin", "").await;
    assert_eq!(location(&admin), "/admin/users");
}

// =============================================================================
// Denied and notices
// =============================================================================

#[tokio::test]
async fn empty_role_is_denied_with_one_notice_per_path() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("empty@example.com", Some("empty"))
        .await;

    for _ in 0..2 {
        let response = app.get("/dashboard/home", &cookies).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    let notices = body_json(app.get("/api/notices", &cookies).await).await;
    let notices = notices.as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["kind"], "access_denied");
    assert_eq!(notices[0]["path"], "/dashboard/home");
    assert_eq!(
        notices[0]["message"],
        "You do not have access to /dashboard/home."
    );

    // A different path is a new denial.
    app.get("/admin/users", &cookies).await;
    let notices = body_json(app.get("/api/notices", &cookies).await).await;
    assert_eq!(notices.as_array().unwrap().len(), 1);
    assert_eq!(notices[0]["path"], "/admin/users");

    // Notices are handed out once.
    let notices = body_json(app.get("/api/notices", &cookies).await).await;
    assert!(notices.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn allowed_navigation_rearms_notice() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("viewer@example.com", Some("viewer"))
        .await;

    app.get("/dashboard/settings", &cookies).await;
    app.get("/dashboard/home", &cookies).await;
    app.get("/dashboard/settings", &cookies).await;

    let notices = body_json(app.get("/api/notices", &cookies).await).await;
    assert_eq!(notices.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn notice_is_shown_on_landing_page() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("viewer@example.com", Some("viewer"))
        .await;

    app.get("/admin/roles", &cookies).await;

    let body = body_text(app.get("/", &cookies).await).await;
    assert!(body.contains("You do not have access to"));
}

#[tokio::test]
async fn user_without_role_is_redirected_without_notice() {
    let app = TestApp::new();
    let cookies = app.create_and_login("new@example.com", None).await;

    let response = app.get("/dashboard/home", &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let notices = body_json(app.get("/api/notices", &cookies).await).await;
    assert!(notices.as_array().unwrap().is_empty());

    let body = body_text(app.get("/", &cookies).await).await;
    assert!(body.contains("has no role yet"));
}

#[tokio::test]
async fn disabled_role_behaves_as_no_role() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("former@example.com", Some("retired"))
        .await;

    let response = app.get("/dashboard/home", &cookies).await;
    assert_eq!(location(&response), "/");

    let session = body_json(app.get("/api/session", &cookies).await).await;
    assert_eq!(session["phase"], "signed_in");
    assert!(session["role"].is_null());
}

// =============================================================================
// Logout and accounts
// =============================================================================

#[tokio::test]
async fn logout_ends_session() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("viewer@example.com", Some("viewer"))
        .await;

    let response = app
        .request_with_cookies(
            axum::http::Request::post("/auth/logout")
                .body(axum::body::Body::empty())
                .unwrap(),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    let response = app.get("/dashboard/home", &cookies).await;
    assert_eq!(location(&response), "/auth/login?from=%2Fdashboard%2Fhome");
}

#[tokio::test]
async fn blocked_user_cannot_log_in() {
    let app = TestApp::new();
    let id = app
        .create_user("blocked@example.com", "secret", Some("admin"))
        .await;
    let mut user = app
        .directory
        .find_user_by_id(id)
        .await
        .unwrap()
        .unwrap();
    user.is_active = false;
    app.directory.insert_user(user);

    let response = app.submit_login("blocked@example.com", "secret", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guard_decisions_are_counted() {
    let app = TestApp::new();
    let cookies = app
        .create_and_login("viewer@example.com", Some("viewer"))
        .await;

    app.get("/dashboard/home", &cookies).await;
    app.get("/dashboard/settings", &cookies).await;

    let metrics = app.state.metrics().encode();
    assert!(metrics.contains("guard_decisions_total{state=\"allowed\"} 1"));
    assert!(metrics.contains("guard_decisions_total{state=\"denied\"} 1"));
}
