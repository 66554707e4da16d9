//! Error types for the recording session manager.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the session manager
///
/// Every variant renders a distinct message; nothing is retried internally
/// except delete-of-missing, which is not an error at all.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The chosen directory does not exist or is not writable
    #[error("storage location {} does not exist or is not writable", .0.display())]
    InvalidLocation(PathBuf),

    /// No storage location has been selected yet
    #[error("no storage location has been selected")]
    NoLocationSelected,

    /// A recording session is already active
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// Stop was requested while no recording is active
    #[error("no recording is in progress")]
    NotRecording,

    /// The capture device reported a failure
    #[error("audio device error: {0}")]
    Device(String),

    /// Capture permission was never granted by the external collaborator
    #[error("capture permission has not been granted")]
    PermissionDenied,

    /// Rename target trims to an empty name
    #[error("new recording name is empty")]
    EmptyName,

    /// Rename target already exists
    #[error("a recording named {0} already exists")]
    NameCollision(String),

    /// The recording vanished between listing and acting on it
    #[error("recording {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The recording's underlying file is missing
    #[error("recording file {} is missing", .0.display())]
    SourceMissing(PathBuf),

    /// Transport-level failure talking to the evaluation service
    #[error("evaluation request failed: {0}")]
    Network(String),

    /// The evaluation service answered with an unexpected payload
    #[error("evaluation response was not in the expected shape: {0}")]
    InvalidResponse(String),

    /// Submit was called without a target recording
    #[error("no recording selected for evaluation")]
    NoRecordingSelected,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session manager operations
pub type Result<T> = std::result::Result<T, SessionError>;
