//! Shelfkeeper inventory application library.
//!
//! The `shelfkeeper` binary and the integration tests both build their router
//! with [`app`], so the tests exercise the same middleware stack as production.

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
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Build the application router.
///
/// `auth_limiter` is applied to the `/auth` routes only; tests pass `None`
/// because their requests carry no client address.
pub fn app<S>(state: AppState, session_store: S, auth_limiter: Option<RateLimiterLayer>) -> Router
where
    S: SessionStore + Clone,
{
    let auth_routes = match auth_limiter {
        Some(limiter) => routes::auth_routes().layer(limiter),
        None => routes::auth_routes(),
    };

    let session_layer = create_session_layer(session_store, state.config());
    let max_upload_bytes = state.config().max_upload_bytes;
    let uploads = ServeDir::new(state.uploads().dir());

    Router::new()
        .merge(routes::routes())
        .nest("/auth", auth_routes)
        .nest_service("/uploads", uploads)
        .layer(session_layer)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
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
