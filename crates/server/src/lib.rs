//! User directory HTTP API.
//!
//! This crate provides the server as a library so the router can be built
//! against any [`db::UserRepository`] and [`services::ImageStore`] adapter,
//! which is how the integration tests drive it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the application router.
///
/// Serves the user API, health checks and stored images. The request body
/// limit applies to every route, including multipart uploads.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let upload_prefix = config.upload_url_prefix.clone();
    let uploads = ServeDir::new(&config.upload_dir);
    let body_limit = config.max_upload_bytes;

    Router::new()
        .merge(routes::routes())
        .nest_service(&upload_prefix, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
