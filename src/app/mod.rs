pub mod handlers;

use crate::core::service::AssessmentService;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AssessmentService>,
}

impl AppState {
    pub fn new(service: AssessmentService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Builds the full HTTP surface: API routes, the landing page and static
/// assets below `static_dir`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/submit-assessment", post(handlers::submit_assessment))
        .route("/api/health", get(handlers::health_check))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        // any origin, method and header; credentials allowed by mirroring
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
