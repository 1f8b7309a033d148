//! Route definitions for the ClaimPool HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use std::time::Duration;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(reservation_routes())
        .merge(holder_routes())
        .merge(pool_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Allocation and per-reservation transitions
fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(handlers::reservation::allocate).get(handlers::reservation::list_reservations),
        )
        .route(
            "/reservations/{id}/payment-window/open",
            post(handlers::reservation::open_payment_window),
        )
        .route(
            "/reservations/{id}/payment-window/close",
            post(handlers::reservation::close_payment_window),
        )
        .route(
            "/reservations/{id}/complete",
            post(handlers::reservation::complete),
        )
        .route(
            "/reservations/{id}/release",
            post(handlers::reservation::release),
        )
}

/// Holder-scoped lookups and webhooks
fn holder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/holders/{holder_id}/active",
            get(handlers::holder::get_active),
        )
        .route(
            "/holders/{holder_id}/complete",
            post(handlers::holder::complete),
        )
        .route("/holders/{holder_id}/cancel", post(handlers::holder::cancel))
        .route(
            "/holders/{holder_id}/history",
            get(handlers::holder::history),
        )
        .route(
            "/holders/{holder_id}/profile",
            put(handlers::holder::set_profile),
        )
}

/// Pool reads
fn pool_routes() -> Router<AppState> {
    Router::new()
        .route("/pool/stats", get(handlers::pool::stats))
        .route("/pool/units", get(handlers::pool::units))
}

/// Operator endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/sweep", post(handlers::admin::sweep))
        .route("/admin/pool/seed", post(handlers::admin::seed_pool))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
