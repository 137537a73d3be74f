#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Tests drive the REAL router built by `routes::build_app`, backed by an
//! in-memory directory and in-memory sessions. Each test builds its own
//! [`TestApp`], so tests never share users or sessions.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use pagewarden_kernel::config::Config;
use pagewarden_kernel::menu::MenuCatalog;
use pagewarden_kernel::models::{Role, User};
use pagewarden_kernel::routes;
use pagewarden_kernel::session;
use pagewarden_kernel::state::AppState;
use pagewarden_kernel::store::MemoryDirectory;

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub directory: Arc<MemoryDirectory>,
    pub state: AppState,
}

impl TestApp {
    /// Create a test application with the built-in menus and roles:
    ///
    /// - `admin`: `dashboard`, `admin`
    /// - `analyst`: `dashboard.analytics`
    /// - `viewer`: `dashboard.home`
    /// - `empty`: no patterns
    /// - `retired`: `dashboard`, disabled
    pub fn new() -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        directory.insert_role(Role::new("admin", "Administrator", ["dashboard", "admin"]));
        directory.insert_role(Role::new("analyst", "Analyst", ["dashboard.analytics"]));
        directory.insert_role(Role::new("viewer", "Viewer", ["dashboard.home"]));
        directory.insert_role(Role::new("empty", "Empty", Vec::<String>::new()));
        let mut retired = Role::new("retired", "Retired", ["dashboard"]);
        retired.is_active = false;
        directory.insert_role(retired);

        let state = AppState::in_memory(directory.clone(), MenuCatalog::builtin())
            .expect("Failed to initialize AppState");

        let config = Config {
            secure_cookies: false,
            ..Config::default()
        };
        let router = routes::build_app(
            state.clone(),
            session::memory_session_layer(&config),
            routes::cors_layer(&config.cors_allowed_origins),
        );

        Self {
            router,
            directory,
            state,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// GET `uri` with cookies.
    pub async fn get(&self, uri: &str, cookies: &str) -> Response {
        self.request_with_cookies(Request::get(uri).body(Body::empty()).unwrap(), cookies)
            .await
    }

    /// Submit the login form, returning the raw response.
    pub async fn submit_login(&self, email: &str, password: &str, from: Option<&str>) -> Response {
        let mut form = format!(
            "email={}&password={}",
            urlencoding::encode(email),
            urlencoding::encode(password)
        );
        if let Some(from) = from {
            form.push_str(&format!("&from={}", urlencoding::encode(from)));
        }

        self.request(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    /// Log in and return session cookies.
    ///
    /// # Panics
    ///
    /// Panics if the login is not redirected (invalid credentials).
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self.submit_login(email, password, None).await;
        assert_eq!(
            response.status(),
            StatusCode::SEE_OTHER,
            "Login failed for '{email}' (status {})",
            response.status()
        );
        extract_cookies(&response)
    }

    /// Create a user, optionally assigning a role.
    pub async fn create_user(&self, email: &str, password: &str, role: Option<&str>) -> Uuid {
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            pass: fast_hash(password).await,
            is_active: true,
            created: chrono::Utc::now(),
        };
        let id = user.id;
        self.directory.insert_user(user);
        if let Some(role) = role {
            assert!(self.directory.assign(id, role), "unknown role {role}");
        }
        id
    }

    /// Create a user with a role and return session cookies after logging in.
    pub async fn create_and_login(&self, email: &str, role: Option<&str>) -> String {
        self.create_user(email, "password", role).await;
        self.login(email, "password").await
    }
}

/// Hash a password with minimal Argon2 params for test speed.
async fn fast_hash(password: &str) -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        let params = argon2::Params::new(4 * 1024, 1, 1, None).expect("test Argon2 params are valid");
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .expect("Failed to hash password")
            .to_string()
    })
    .await
    .expect("Argon2 hashing task panicked")
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Collect a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
