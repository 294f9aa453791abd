//! API route definitions
//!
//! Organizes endpoints for the maintenance dashboard:
//! - /api/v1/status - Service status and counters
//! - /api/v1/rules - Threshold rules with live activation state
//! - /api/v1/scenarios - Degradation scenario catalog
//! - /api/v1/simulate - On-demand health projection
//! - /api/v1/evaluate - Batch alert evaluation
//! - /api/v1/cycle - Full monitoring cycle

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::pipeline::MonitorState;

/// Create all API routes for the dashboard
pub fn api_routes(state: MonitorState) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/rules", get(handlers::get_rules))
        .route("/scenarios", get(handlers::get_scenarios))
        .route("/simulate", post(handlers::simulate))
        .route("/evaluate", post(handlers::evaluate))
        .route("/cycle", post(handlers::run_cycle))
        .with_state(state)
}

/// Legacy health endpoint at root level
pub fn legacy_routes() -> Router {
    Router::new().route("/health", get(handlers::legacy_health_check))
}
