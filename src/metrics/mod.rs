//! Prometheus metrics for the catalog service.
//!
//! All metrics live in one process-wide registry, registered once by
//! [`init_metrics`] and rendered by [`gather_metrics`] for `/metrics`.
//!
//! # Example
//! ```no_run
//! use lyric_catalog::metrics::SEARCH_REQUESTS_TOTAL;
//!
//! SEARCH_REQUESTS_TOTAL.with_label_values(&["fuzzy"]).inc();
//! ```

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};
use std::time::Instant;

const NAMESPACE: &str = "lyric_catalog";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // HTTP

    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // Search

    /// Labels: kind (exact, fuzzy, browse)
    pub static ref SEARCH_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_requests_total", "Total number of catalog searches")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    pub static ref SEARCH_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("search_duration_seconds", "Time spent filtering and sorting")
            .namespace(NAMESPACE)
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    // Auth

    /// Labels: outcome (success, invalid_password, rate_limited)
    pub static ref LOGIN_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("login_attempts_total", "Total number of admin login attempts")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create LOGIN_ATTEMPTS_TOTAL metric");

    pub static ref RATE_LIMIT_LOCKOUTS_TOTAL: Counter = Counter::with_opts(
        Opts::new("rate_limit_lockouts_total", "Clients locked out after too many failures")
            .namespace(NAMESPACE)
    ).expect("Failed to create RATE_LIMIT_LOCKOUTS_TOTAL metric");

    pub static ref CREDENTIAL_MIGRATIONS_TOTAL: Counter = Counter::with_opts(
        Opts::new("credential_migrations_total", "Plain-text credentials upgraded to salted hashes")
            .namespace(NAMESPACE)
    ).expect("Failed to create CREDENTIAL_MIGRATIONS_TOTAL metric");

    pub static ref ACTIVE_SESSIONS: Gauge = Gauge::with_opts(
        Opts::new("active_sessions", "Admin sessions currently held")
            .namespace(NAMESPACE)
    ).expect("Failed to create ACTIVE_SESSIONS metric");
}

/// Register every metric with the global registry.
///
/// Errors if called twice in one process.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(LOGIN_ATTEMPTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(RATE_LIMIT_LOCKOUTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CREDENTIAL_MIGRATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ACTIVE_SESSIONS.clone()))?;

    tracing::info!("Prometheus metrics registered");
    Ok(())
}

/// Render the registry in the Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

/// Axum middleware recording request count and latency per route
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // Route template keeps label cardinality bounded
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(start.elapsed().as_secs_f64());

    response
}
