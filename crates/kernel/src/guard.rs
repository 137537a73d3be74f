//! Route guard.
//!
//! Every navigation is evaluated afresh against the current session
//! snapshot: the attempted path is reduced to an access key and tested
//! against the role's patterns. Nothing is cached between navigations.

use serde::{Deserialize, Serialize};

use crate::access::{matches_pattern, path_to_access_key};
use crate::session::{SessionPhase, SessionSnapshot};

/// Guard decision for one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    /// Session restore has not completed.
    Initializing,
    /// No session; `from` is the attempted path.
    Unauthenticated { from: String },
    /// Signed in, but no usable role.
    NoRole,
    Allowed { access_key: String },
    Denied { access_key: String },
}

/// What the router should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Hold the navigation until the session is known.
    Pending,
    Render,
    Redirect { location: String },
}

/// Redirect targets used by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRoutes {
    pub login_path: String,
    pub default_landing: String,
}

impl Default for GuardRoutes {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            default_landing: "/".to_string(),
        }
    }
}

impl GuardRoutes {
    /// Login location that brings the user back to `from` afterwards.
    pub fn login_redirect(&self, from: &str) -> String {
        format!("{}?from={}", self.login_path, urlencoding::encode(from))
    }

    /// Where to go after signing in.
    ///
    /// Only local paths are honoured; anything else lands on the default.
    pub fn post_login_target(&self, from: Option<&str>) -> String {
        match from {
            Some(path) if is_local_path(path) => path.to_string(),
            _ => self.default_landing.clone(),
        }
    }
}

/// A path on this site: one leading `/`, not followed by `/` or `\`
/// (browsers read `/\host` as `//host`), and no control characters.
fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !path.chars().any(char::is_control)
}

impl GuardState {
    /// Evaluate a navigation to `path`.
    ///
    /// A signed-in session with a role that grants nothing is `Denied`, not
    /// `NoRole`.
    pub fn evaluate(snapshot: &SessionSnapshot, path: &str) -> Self {
        match &snapshot.phase {
            SessionPhase::Initializing => Self::Initializing,
            SessionPhase::SignedOut => Self::Unauthenticated {
                from: path.to_string(),
            },
            SessionPhase::SignedIn(_) => {
                let Some(role) = &snapshot.role else {
                    return Self::NoRole;
                };
                let access_key = path_to_access_key(path);
                if matches_pattern(&access_key, &role.page_access) {
                    Self::Allowed { access_key }
                } else {
                    Self::Denied { access_key }
                }
            }
        }
    }

    pub fn outcome(&self, routes: &GuardRoutes) -> GuardOutcome {
        match self {
            Self::Initializing => GuardOutcome::Pending,
            Self::Unauthenticated { from } => GuardOutcome::Redirect {
                location: routes.login_redirect(from),
            },
            Self::NoRole | Self::Denied { .. } => GuardOutcome::Redirect {
                location: routes.default_landing.clone(),
            },
            Self::Allowed { .. } => GuardOutcome::Render,
        }
    }

    /// Short name for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::NoRole => "no_role",
            Self::Allowed { .. } => "allowed",
            Self::Denied { .. } => "denied",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// A message queued for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    AccessDenied { path: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::AccessDenied { path } => format!("You do not have access to {path}."),
        }
    }
}

/// Emits one access denied notice per denial event.
///
/// Denying the same path again stays quiet until an allowed navigation
/// re-arms the notifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialNotifier {
    last_denied: Option<String>,
}

impl DenialNotifier {
    /// Record a guard decision, returning a notice if one should be shown.
    pub fn observe(&mut self, state: &GuardState, path: &str) -> Option<Notice> {
        match state {
            GuardState::Denied { .. } => {
                if self.last_denied.as_deref() == Some(path) {
                    return None;
                }
                self.last_denied = Some(path.to_string());
                Some(Notice::AccessDenied {
                    path: path.to_string(),
                })
            }
            GuardState::Allowed { .. } => {
                self.last_denied = None;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::Role;
    use crate::session::Identity;

    fn signed_in(patterns: &[&str]) -> SessionSnapshot {
        let identity = Identity {
            user_id: Uuid::now_v7(),
            email: "kim@example.com".to_string(),
            display_name: "Kim".to_string(),
        };
        let role = Role::new("r", "R", patterns.iter().copied());
        SessionSnapshot::signed_in(identity, Some(role))
    }

    #[test]
    fn ancestor_of_derived_key_is_allowed() {
        let snapshot = signed_in(&["dashboard.analytics"]);
        let state = GuardState::evaluate(&snapshot, "/dashboard/analytics/reports");
        assert_eq!(
            state,
            GuardState::Allowed {
                access_key: "dashboard.analytics".to_string()
            }
        );
        assert_eq!(state.outcome(&GuardRoutes::default()), GuardOutcome::Render);
    }

    #[test]
    fn empty_role_is_denied_with_one_notice_per_path() {
        let snapshot = signed_in(&[]);
        let routes = GuardRoutes::default();
        let mut notifier = DenialNotifier::default();

        let state = GuardState::evaluate(&snapshot, "/dashboard/home");
        assert!(matches!(state, GuardState::Denied { .. }));
        assert_eq!(
            state.outcome(&routes),
            GuardOutcome::Redirect {
                location: "/".to_string()
            }
        );
        assert_eq!(
            notifier.observe(&state, "/dashboard/home"),
            Some(Notice::AccessDenied {
                path: "/dashboard/home".to_string()
            })
        );
        // Re-rendering the same denial stays quiet.
        assert_eq!(notifier.observe(&state, "/dashboard/home"), None);

        let other = GuardState::evaluate(&snapshot, "/admin/users");
        assert!(notifier.observe(&other, "/admin/users").is_some());
    }

    #[test]
    fn allowed_navigation_rearms_notifier() {
        let snapshot = signed_in(&["dashboard.home"]);
        let mut notifier = DenialNotifier::default();

        let denied = GuardState::evaluate(&snapshot, "/admin");
        assert!(notifier.observe(&denied, "/admin").is_some());
        assert!(notifier.observe(&denied, "/admin").is_none());

        let allowed = GuardState::evaluate(&snapshot, "/dashboard/home");
        assert!(notifier.observe(&allowed, "/dashboard/home").is_none());
        assert!(notifier.observe(&denied, "/admin").is_some());
    }

    #[test]
    fn signed_out_redirects_to_login_with_from() {
        let state = GuardState::evaluate(&SessionSnapshot::signed_out(), "/dashboard/home");
        assert_eq!(
            state.outcome(&GuardRoutes::default()),
            GuardOutcome::Redirect {
                location: "/auth/login?from=%2Fdashboard%2Fhome".to_string()
            }
        );
    }

    #[test]
    fn no_role_never_redirects_to_attempted_path() {
        let identity = Identity {
            user_id: Uuid::now_v7(),
            email: "kim@example.com".to_string(),
            display_name: "Kim".to_string(),
        };
        let snapshot = SessionSnapshot::signed_in(identity, None);
        let state = GuardState::evaluate(&snapshot, "/dashboard/home");
        assert_eq!(state, GuardState::NoRole);
        assert_eq!(
            state.outcome(&GuardRoutes::default()),
            GuardOutcome::Redirect {
                location: "/".to_string()
            }
        );
    }

    #[test]
    fn initializing_is_pending() {
        let state = GuardState::evaluate(&SessionSnapshot::initializing(), "/dashboard");
        assert_eq!(state.outcome(&GuardRoutes::default()), GuardOutcome::Pending);
        assert_eq!(state.label(), "initializing");
    }

    #[test]
    fn post_login_target_only_accepts_local_paths() {
        let routes = GuardRoutes::default();
        assert_eq!(routes.post_login_target(Some("/dashboard/home")), "/dashboard/home");
        assert_eq!(routes.post_login_target(Some("//evil.example")), "/");
        assert_eq!(routes.post_login_target(Some("https://evil.example")), "/");
        assert_eq!(routes.post_login_target(Some("/\\evil.example")), "/");
        assert_eq!(routes.post_login_target(Some("/\t/evil.example")), "/");
        assert_eq!(routes.post_login_target(Some("/dashboard\nLocation: x")), "/");
        assert_eq!(routes.post_login_target(Some("/")), "/");
        assert_eq!(routes.post_login_target(None), "/");
    }

    #[test]
    fn notice_serializes_with_kind_tag() {
        let notice = Notice::AccessDenied {
            path: "/admin".to_string(),
        };
        let json = serde_json::to_value(&notice).unwrap_or_default();
        assert_eq!(json["kind"], "access_denied");
        assert_eq!(json["path"], "/admin");
    }
}
