use crate::catalog::{display_name_of, Recording};
use crate::config::RecorderConfig;
use crate::device::SharedDevice;
use crate::error::{Result, SessionError};
use crate::storage::StorageLocation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Snapshot of an active recording session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub path: PathBuf,
    pub started_at: DateTime<Utc>,
}

enum RecorderState {
    Idle,
    Recording(SessionInfo),
}

/// Recording lifecycle state machine: `Idle -> Recording -> Idle`
///
/// At most one session records at a time; a second `start` is rejected, not
/// queued. Device faults abort the session back to `Idle`. Filenames embed a
/// strictly monotonic millisecond timestamp, so they are unique within a
/// location even when two recordings start inside the same millisecond.
pub struct RecordingLifecycle {
    device: SharedDevice,
    config: RecorderConfig,
    state: Mutex<RecorderState>,
    last_stamp: AtomicI64,
}

impl RecordingLifecycle {
    pub fn new(device: SharedDevice, config: RecorderConfig) -> Self {
        Self {
            device,
            config,
            state: Mutex::new(RecorderState::Idle),
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Begin a new recording in the given location
    pub async fn start(&self, location: Option<&StorageLocation>) -> Result<SessionInfo> {
        let location = location.ok_or(SessionError::NoLocationSelected)?;

        let mut state = self.state.lock().await;
        if matches!(*state, RecorderState::Recording(_)) {
            return Err(SessionError::AlreadyRecording);
        }

        let stamp = self.next_stamp();
        let file_name = format!(
            "{}_{}.{}",
            self.config.file_prefix, stamp, self.config.extension
        );
        let path = location.path.join(file_name);
        let session = SessionInfo {
            session_id: Uuid::new_v4(),
            path: path.clone(),
            started_at: Utc::now(),
        };

        info!(
            "starting recording session {}: {}",
            session.session_id,
            path.display()
        );

        {
            let mut device = self.device.lock().await;
            if let Err(fault) = device.start_capture(&path).await {
                error!("capture failed to start: {}", fault);
                return Err(fault.into());
            }
        }

        *state = RecorderState::Recording(session.clone());
        Ok(session)
    }

    /// Finalize the active recording and return the completed entity
    pub async fn stop(&self) -> Result<Recording> {
        let mut state = self.state.lock().await;
        let session = match std::mem::replace(&mut *state, RecorderState::Idle) {
            RecorderState::Idle => return Err(SessionError::NotRecording),
            RecorderState::Recording(session) => session,
        };

        // State is already Idle: a device fault on stop aborts the session
        // rather than leaving it stuck in Recording.
        {
            let mut device = self.device.lock().await;
            if let Err(fault) = device.stop_capture().await {
                error!("capture failed to stop: {}", fault);
                return Err(fault.into());
            }
        }

        info!(
            "recording session {} finished: {}",
            session.session_id,
            session.path.display()
        );

        let created_at = std::fs::metadata(&session.path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Recording {
            display_name: display_name_of(&session.path),
            created_at,
            path: session.path,
        })
    }

    /// Whether a session is currently recording
    pub async fn is_recording(&self) -> bool {
        matches!(*self.state.lock().await, RecorderState::Recording(_))
    }

    /// Active session snapshot, if any
    pub async fn current_session(&self) -> Option<SessionInfo> {
        match &*self.state.lock().await {
            RecorderState::Idle => None,
            RecorderState::Recording(session) => Some(session.clone()),
        }
    }

    /// Next filename stamp: wall-clock milliseconds, bumped past the last
    /// issued value when the clock has not advanced
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(prev + 1)
    }
}
