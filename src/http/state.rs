use crate::catalog::RecordingCatalog;
use crate::evaluation::EvaluationSubmitter;
use crate::session::{PlaybackController, RecordingLifecycle};
use crate::storage::StorageLocationResolver;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Mutex<StorageLocationResolver>>,
    pub recorder: Arc<RecordingLifecycle>,
    pub catalog: Arc<RecordingCatalog>,
    pub playback: Arc<PlaybackController>,
    pub submitter: Arc<EvaluationSubmitter>,
}

impl AppState {
    pub fn new(
        resolver: StorageLocationResolver,
        recorder: Arc<RecordingLifecycle>,
        catalog: Arc<RecordingCatalog>,
        playback: Arc<PlaybackController>,
        submitter: Arc<EvaluationSubmitter>,
    ) -> Self {
        Self {
            resolver: Arc::new(Mutex::new(resolver)),
            recorder,
            catalog,
            playback,
            submitter,
        }
    }
}
