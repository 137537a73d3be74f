//! Access pattern matching.

/// Check whether an access key is granted by any of the given patterns.
///
/// A pattern `P` grants key `K` when `K == P` or `K` starts with `P.`, so a
/// one-segment pattern such as `dashboard` covers every page below it while
/// `dashboard.home` only covers itself. Matching respects segment boundaries:
/// `dashboard` does not grant `dashboardX`.
///
/// An empty pattern set grants nothing.
pub fn matches_pattern<I, S>(key: &str, patterns: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .any(|pattern| pattern_grants(pattern.as_ref(), key))
}

fn pattern_grants(pattern: &str, key: &str) -> bool {
    match key.strip_prefix(pattern) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}
