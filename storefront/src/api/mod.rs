//! HTTP API

pub mod auth;
pub mod business_hours;
pub mod health;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::core::AppState;
use auth::admin_auth_middleware;

/// Create the storefront router
pub fn create_router(state: AppState) -> Router {
    // Admin writes sit behind the bearer token, storefront reads are public
    let admin = middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/business-hours",
            get(business_hours::get_schedule)
                .merge(put(business_hours::save_schedule).route_layer(admin.clone())),
        )
        .route(
            "/api/business-hours/refresh",
            post(business_hours::refresh_schedule).route_layer(admin),
        )
        .route("/api/business-hours/status", get(business_hours::get_status))
        .route(
            "/api/business-hours/formatted",
            get(business_hours::get_formatted),
        )
        .route(
            "/api/orders/validate-time",
            post(business_hours::validate_order_time),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
