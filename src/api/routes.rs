use crate::api::{handlers, AppState};
use crate::metrics::track_http_metrics;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        // Songs
        .route(
            "/v1/songs",
            get(handlers::search_songs).post(handlers::create_song),
        )
        .route(
            "/v1/songs/:id",
            get(handlers::get_song)
                .put(handlers::update_song)
                .delete(handlers::delete_song),
        )
        // Lists
        .route(
            "/v1/lists",
            get(handlers::list_lists).post(handlers::create_list),
        )
        .route(
            "/v1/lists/:id",
            get(handlers::get_list)
                .put(handlers::update_list)
                .delete(handlers::delete_list),
        )
        // Admin sessions
        .route("/v1/admin/login", post(handlers::login))
        .route("/v1/admin/logout", post(handlers::logout));

    if state.config.observability.prometheus_enabled {
        router = router.route("/metrics", get(handlers::metrics));
    }

    router
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(track_http_metrics))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}
