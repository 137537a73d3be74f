//! URL path to access key conversion.

/// Maximum number of path segments that contribute to a derived access key.
///
/// Deeper paths inherit the permission of their two-segment ancestor, so
/// `/dashboard/analytics/reports` is gated by `dashboard.analytics`.
pub const MAX_ACCESS_KEY_DEPTH: usize = 2;

/// Convert a URL path into its access key.
///
/// Empty segments are discarded, which strips leading and trailing slashes
/// and collapses repeated ones. At most [`MAX_ACCESS_KEY_DEPTH`] segments are
/// kept and joined with `.`. The root path yields an empty key.
///
/// ```
/// use pagewarden_kernel::access::path_to_access_key;
///
/// assert_eq!(path_to_access_key("/dashboard"), "dashboard");
/// assert_eq!(path_to_access_key("/dashboard/home"), "dashboard.home");
/// assert_eq!(path_to_access_key("/dashboard/analytics/reports"), "dashboard.analytics");
/// assert_eq!(path_to_access_key("/"), "");
/// ```
pub fn path_to_access_key(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .take(MAX_ACCESS_KEY_DEPTH)
        .collect::<Vec<_>>()
        .join(".")
}
