use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::handlers::{catalog, health, shipping};
use crate::middleware::request_log::log_request;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Storefront data
    let catalog_routes = Router::new()
        .route("/menu", get(catalog::list_menu))
        .route("/menu/{id}", get(catalog::get_menu_item))
        .route("/branches", get(catalog::list_branches));

    // Delivery fee quotes
    let shipping_routes = Router::new().route("/quote", post(shipping::quote));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api", catalog_routes)
        .nest("/api/shipping", shipping_routes)
        .with_state(state)
}

/// Router with the full middleware stack. Needs to be served with
/// `ConnectInfo<SocketAddr>` for per-IP limiting and request logs.
pub fn create_app(state: AppState) -> AppResult<Router> {
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(state.config.rate_limit_replenish_secs)
            .burst_size(state.config.rate_limit_burst)
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid rate limit configuration".to_string()))?,
    );

    // Last layer added runs first: logging wraps the rate limiter
    Ok(create_router(state)
        .layer(GovernorLayer::new(governor_config))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(log_request)))
}
