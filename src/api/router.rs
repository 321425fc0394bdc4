use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_reservation, get_reservation_by_id, list_active, list_all_reservations,
    list_overdue, return_book,
};

/// Creates the API router with all reservation endpoints
///
/// Command endpoints (Write operations):
/// - POST /reservations - Create a new reservation
/// - POST /reservations/:id/return - Return a book
///
/// Query endpoints (Read operations):
/// - GET /reservations - List reservations, optionally by user_id and status
/// - GET /reservations/active - List active reservations
/// - GET /reservations/overdue - List overdue reservations
/// - GET /reservations/:id - Get reservation details
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route(
            "/reservations",
            post(create_reservation).get(list_all_reservations),
        )
        .route("/reservations/active", get(list_active))
        .route("/reservations/overdue", get(list_overdue))
        .route("/reservations/:id", get(get_reservation_by_id))
        .route("/reservations/:id/return", post(return_book))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
