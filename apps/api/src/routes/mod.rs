pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::registry::handlers as registry;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Hiring side: masters and instances
        .route(
            "/api/v1/assessments/masters",
            post(registry::handle_get_or_create_master),
        )
        .route(
            "/api/v1/assessments/masters/regenerate",
            post(registry::handle_regenerate_master),
        )
        .route(
            "/api/v1/assessments/masters/:id/instances",
            post(registry::handle_create_instance),
        )
        // Candidate side: token-addressed tests
        .route("/api/v1/tests/:token", get(registry::handle_get_test))
        .route(
            "/api/v1/tests/:token/submissions",
            post(scoring::handle_submit),
        )
        .with_state(state)
}
