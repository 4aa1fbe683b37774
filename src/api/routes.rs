//! API route definitions
//!
//! - `GET  /`        - liveness text
//! - `POST /analyze` - on-demand batch analysis

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

/// Create all API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .with_state(state)
}
