use super::state::AppState;
use crate::catalog::Recording;
use crate::error::SessionError;
use crate::evaluation::{EvaluationRecord, EvaluationResult};
use crate::session::SessionInfo;
use crate::storage::StorageLocation;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectStorageRequest {
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct StorageResponse {
    /// Currently selected recordings directory, if any
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct RecordingRequest {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub path: PathBuf,
    pub new_name: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Error mapping
// ============================================================================

fn error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::InvalidLocation(_)
        | SessionError::NoLocationSelected
        | SessionError::EmptyName
        | SessionError::NoRecordingSelected => StatusCode::BAD_REQUEST,
        SessionError::AlreadyRecording
        | SessionError::NotRecording
        | SessionError::NameCollision(_) => StatusCode::CONFLICT,
        SessionError::NotFound(_) | SessionError::SourceMissing(_) => StatusCode::NOT_FOUND,
        SessionError::PermissionDenied => StatusCode::FORBIDDEN,
        SessionError::Network(_) | SessionError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        SessionError::Device(_) | SessionError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /storage
/// Show the currently selected storage location
pub async fn get_storage(State(state): State<AppState>) -> impl IntoResponse {
    let resolver = state.resolver.lock().await;
    Json(StorageResponse {
        path: resolver.current().map(|l| l.path.clone()),
    })
}

/// POST /storage/select
/// Validate, persist and adopt a recordings directory
pub async fn select_storage(
    State(state): State<AppState>,
    Json(req): Json<SelectStorageRequest>,
) -> Response {
    let mut resolver = state.resolver.lock().await;
    match resolver.select(&req.path).await {
        Ok(location) => (StatusCode::OK, Json(location)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/record/start
/// Start a new recording session in the selected location
pub async fn start_recording(State(state): State<AppState>) -> Response {
    let location = {
        let resolver = state.resolver.lock().await;
        resolver.current().cloned()
    };

    match state.recorder.start(location.as_ref()).await {
        Ok(session) => (StatusCode::OK, Json::<SessionInfo>(session)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/record/stop
/// Finalize the active recording
pub async fn stop_recording(State(state): State<AppState>) -> Response {
    match state.recorder.stop().await {
        Ok(recording) => {
            info!("recording saved: {}", recording.path.display());
            (StatusCode::OK, Json::<Recording>(recording)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /recordings
/// List recordings in the selected location, most recent first
pub async fn list_recordings(State(state): State<AppState>) -> Response {
    let location: Option<StorageLocation> = {
        let resolver = state.resolver.lock().await;
        resolver.current().cloned()
    };

    let Some(location) = location else {
        return error_response(SessionError::NoLocationSelected);
    };

    match state.catalog.list(&location).await {
        Ok(recordings) => (StatusCode::OK, Json::<Vec<Recording>>(recordings)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/rename
/// Move a recording to a new base name
pub async fn rename_recording(
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> Response {
    let recording = Recording::from_path(req.path);
    match state.catalog.rename(&recording, &req.new_name).await {
        Ok(renamed) => (StatusCode::OK, Json::<Recording>(renamed)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/delete
/// Remove a recording; deleting an absent file is a success
pub async fn delete_recording(
    State(state): State<AppState>,
    Json(req): Json<RecordingRequest>,
) -> Response {
    let recording = Recording::from_path(req.path.clone());
    match state.catalog.delete(&recording).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "deleted".to_string(),
                message: format!("Recording {} deleted", req.path.display()),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/play
/// Start playback, stopping any prior playback first
pub async fn play_recording(
    State(state): State<AppState>,
    Json(req): Json<RecordingRequest>,
) -> Response {
    let recording = Recording::from_path(req.path.clone());
    match state.playback.play(&recording).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "playing".to_string(),
                message: format!("Playing {}", req.path.display()),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/play/stop
/// Halt playback
pub async fn stop_playback(State(state): State<AppState>) -> Response {
    match state.playback.stop().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "stopped".to_string(),
                message: "Playback stopped".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /evaluation/submit
/// Upload a recording to the evaluation service and return the verdict
pub async fn submit_evaluation(
    State(state): State<AppState>,
    Json(req): Json<RecordingRequest>,
) -> Response {
    let recording = Recording::from_path(req.path);
    match state.submitter.submit(Some(&recording)).await {
        Ok(result) => (StatusCode::OK, Json::<EvaluationResult>(result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /evaluation/history
/// Fetch past evaluations from the service
pub async fn evaluation_history(State(state): State<AppState>) -> Response {
    match state.submitter.history().await {
        Ok(records) => (StatusCode::OK, Json::<Vec<EvaluationRecord>>(records)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
