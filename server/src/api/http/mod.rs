//! HTTP API handlers

mod booking;
mod health;
mod links;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Link registry routes
        .route("/links", post(links::create_link))
        .route("/links", get(links::list_links))
        .route("/links/availability", get(booking::find_candidates))
        .route("/links/{id}", get(links::get_link))
        .route("/links/{id}", delete(links::delete_link))
        .route("/links/{id}/status", post(links::set_link_status))
        .route("/links/{id}/stats", get(links::get_link_stats))
        // Booking routes
        .route("/links/{id}/availability", get(booking::check_availability))
        .route("/links/{id}/reserve", post(booking::reserve_link))
        .route("/links/{id}/release", post(booking::release_link));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
