use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Storage location
        .route("/storage", get(handlers::get_storage))
        .route("/storage/select", post(handlers::select_storage))
        // Recording control
        .route("/recordings/record/start", post(handlers::start_recording))
        .route("/recordings/record/stop", post(handlers::stop_recording))
        // Catalog
        .route("/recordings", get(handlers::list_recordings))
        .route("/recordings/rename", post(handlers::rename_recording))
        .route("/recordings/delete", post(handlers::delete_recording))
        // Playback
        .route("/recordings/play", post(handlers::play_recording))
        .route("/recordings/play/stop", post(handlers::stop_playback))
        // Evaluation
        .route("/evaluation/submit", post(handlers::submit_evaluation))
        .route("/evaluation/history", get(handlers::evaluation_history))
        // Request logging + CORS for app clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
