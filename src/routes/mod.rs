//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Quiz sessions
        .route("/api/v1/session", post(http::http_create_session))
        .route("/api/v1/session/question", post(http::http_next_question))
        .route("/api/v1/session/answer", post(http::http_submit_answer))
        .route("/api/v1/session/end", post(http::http_end_session))
        // Ratings
        .route("/api/v1/match", post(http::http_record_match))
        .route("/api/v1/leaderboard", get(http::http_leaderboard))
        // Survival mode
        .route("/api/v1/survival/round", post(http::http_start_survival))
        .route("/api/v1/survival/round/next", post(http::http_next_survival_round))
        .route("/api/v1/survival/round/end", post(http::http_end_survival_round))
        .route("/api/v1/survival/guess", post(http::http_submit_guess))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
