//! Prometheus metrics collection.
//!
//! Provides access-control metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

/// Route guard decision labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct GuardLabels {
    pub state: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Route guard evaluations by resulting state.
    pub guard_decisions: Family<GuardLabels, Counter>,

    /// Access denied notices queued for users.
    pub denial_notices: Counter,

    /// Role cache hit counter.
    pub role_cache_hits: Counter,

    /// Role cache miss counter.
    pub role_cache_misses: Counter,

    /// Role lookups that failed and were treated as "no role".
    pub role_resolution_failures: Counter,

    /// Failed sign-in attempts.
    pub login_failures: Counter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let guard_decisions = Family::<GuardLabels, Counter>::default();
        registry.register(
            "guard_decisions",
            "Route guard decisions by state",
            guard_decisions.clone(),
        );

        let denial_notices = Counter::default();
        registry.register(
            "guard_denial_notices",
            "Access denied notices queued",
            denial_notices.clone(),
        );

        let role_cache_hits = Counter::default();
        registry.register(
            "role_cache_hits",
            "Role cache hit count",
            role_cache_hits.clone(),
        );

        let role_cache_misses = Counter::default();
        registry.register(
            "role_cache_misses",
            "Role cache miss count",
            role_cache_misses.clone(),
        );

        let role_resolution_failures = Counter::default();
        registry.register(
            "role_resolution_failures",
            "Role lookups that failed closed",
            role_resolution_failures.clone(),
        );

        let login_failures = Counter::default();
        registry.register(
            "login_failures",
            "Failed sign-in attempts",
            login_failures.clone(),
        );

        Self {
            registry,
            guard_decisions,
            denial_notices,
            role_cache_hits,
            role_cache_misses,
            role_resolution_failures,
            login_failures,
        }
    }

    /// Record a route guard decision.
    pub fn record_guard(&self, state: &str) {
        self.guard_decisions
            .get_or_create(&GuardLabels {
                state: state.to_string(),
            })
            .inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_includes_guard_decisions() {
        let metrics = Metrics::new();
        metrics.record_guard("denied");
        metrics.record_guard("denied");
        metrics.role_cache_misses.inc();

        let output = metrics.encode();
        assert!(output.contains("guard_decisions_total{state=\"denied\"} 2"));
        assert!(output.contains("role_cache_misses_total 1"));
    }
}
