use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes(upload_limit))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/courses", get(handlers::list_courses))
        .route("/courses/:course_id", get(handlers::get_course))
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        .route(
            "/recommendations/export",
            get(handlers::export_recommendations),
        )
        // Dataset
        .route("/stats", get(handlers::get_stats))
        .route(
            "/dataset",
            post(handlers::upload_dataset).layer(DefaultBodyLimit::max(upload_limit)),
        )
}
