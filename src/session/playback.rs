use crate::catalog::Recording;
use crate::device::{PlaybackProgress, SharedDevice};
use crate::error::{Result, SessionError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Events emitted by the playback controller
///
/// `Completed` is the auto-stop at end of media; a user-initiated `stop`
/// never produces it, so observers can tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Progress {
        path: PathBuf,
        position_ms: u64,
        duration_ms: u64,
    },
    Completed {
        path: PathBuf,
    },
}

enum PlaybackState {
    Stopped,
    Playing { path: PathBuf },
}

/// Playback state machine: `Stopped -> Playing -> Stopped`
///
/// One playback at a time; playing a second recording stops the first.
/// Completion is detected from the device's progress stream, so it is
/// testable without real audio hardware.
pub struct PlaybackController {
    device: SharedDevice,
    state: Arc<Mutex<PlaybackState>>,
    events: mpsc::Sender<PlaybackEvent>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackController {
    /// Create the controller and the receiving end of its event channel
    pub fn new(device: SharedDevice) -> (Self, mpsc::Receiver<PlaybackEvent>) {
        let (events, events_rx) = mpsc::channel(64);
        let controller = Self {
            device,
            state: Arc::new(Mutex::new(PlaybackState::Stopped)),
            events,
            monitor: Mutex::new(None),
        };
        (controller, events_rx)
    }

    /// Start playing a recording, stopping any prior playback first
    pub async fn play(&self, recording: &Recording) -> Result<()> {
        if !recording.path.is_file() {
            return Err(SessionError::SourceMissing(recording.path.clone()));
        }

        self.halt().await?;

        let progress_rx = {
            let mut device = self.device.lock().await;
            device.start_playback(&recording.path).await?
        };

        *self.state.lock().await = PlaybackState::Playing {
            path: recording.path.clone(),
        };
        info!("playback started: {}", recording.path.display());

        let monitor = tokio::spawn(monitor_progress(
            Arc::clone(&self.state),
            self.device.clone(),
            self.events.clone(),
            recording.path.clone(),
            progress_rx,
        ));
        *self.monitor.lock().await = Some(monitor);

        Ok(())
    }

    /// Halt playback immediately
    pub async fn stop(&self) -> Result<()> {
        if !self.halt().await? {
            debug!("playback stop requested while already stopped");
        }
        Ok(())
    }

    /// Path of the recording currently playing, if any
    pub async fn current(&self) -> Option<PathBuf> {
        match &*self.state.lock().await {
            PlaybackState::Stopped => None,
            PlaybackState::Playing { path } => Some(path.clone()),
        }
    }

    /// Stop the monitor and the device if something is playing; returns
    /// whether a playback was actually halted
    async fn halt(&self) -> Result<bool> {
        if let Some(handle) = self.monitor.lock().await.take() {
            handle.abort();
        }

        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, PlaybackState::Stopped)
        };

        match previous {
            PlaybackState::Stopped => Ok(false),
            PlaybackState::Playing { path } => {
                let mut device = self.device.lock().await;
                device.stop_playback().await?;
                info!("playback stopped: {}", path.display());
                Ok(true)
            }
        }
    }
}

/// Forwards progress and turns end-of-media into a `Completed` event
async fn monitor_progress(
    state: Arc<Mutex<PlaybackState>>,
    device: SharedDevice,
    events: mpsc::Sender<PlaybackEvent>,
    path: PathBuf,
    mut progress_rx: mpsc::Receiver<PlaybackProgress>,
) {
    while let Some(progress) = progress_rx.recv().await {
        let _ = events
            .send(PlaybackEvent::Progress {
                path: path.clone(),
                position_ms: progress.position_ms,
                duration_ms: progress.duration_ms,
            })
            .await;

        if progress.position_ms >= progress.duration_ms {
            *state.lock().await = PlaybackState::Stopped;
            if let Err(fault) = device.lock().await.stop_playback().await {
                warn!("device stop after completion failed: {}", fault);
            }
            info!("playback completed: {}", path.display());
            let _ = events.send(PlaybackEvent::Completed { path }).await;
            return;
        }
    }

    // Progress stream ended without reaching the duration: the device was
    // stopped externally and halt() already settled the state.
    debug!("playback progress stream ended: {}", path.display());
}
