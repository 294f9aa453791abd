//! REST API module using Axum
//!
//! Provides HTTP endpoints for the predictive maintenance service:
//! - v1 API with consistent envelope (status, rules, scenarios, simulate,
//!   evaluate, cycle)
//! - Legacy `/health` probe kept shape-compatible with earlier deployments

pub mod envelope;
pub mod handlers;
mod routes;

use axum::http::{header, Method};
use axum::response::Response;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::MonitorState;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `VIGIA_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development (e.g., `http://localhost:5173` for a dashboard dev server).
fn build_cors_layer() -> CorsLayer {
    match std::env::var("VIGIA_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => {
            // No cross-origin allowed
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
    }
}

/// Enveloped 404 for unmatched paths.
async fn fallback_not_found() -> Response {
    envelope::ApiErrorResponse::not_found("no such endpoint")
}

/// Create the complete application router.
pub fn create_app(state: MonitorState) -> Router {
    Router::new()
        // v1 API
        .nest("/api/v1", routes::api_routes(state))
        // Legacy health endpoint at /health
        .merge(routes::legacy_routes())
        .fallback(fallback_not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}
