// Shared test support: a scripted audio device for driving the session
// state machines without real hardware.

#![allow(dead_code)]

use async_trait::async_trait;
use sleepair_recorder::{AudioDevice, DeviceFault, PlaybackProgress};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Deterministic stand-in for a real capture/playback device
///
/// Faults are consumed one-shot: set `fail_capture_start` and the next
/// `start_capture` fails, the one after succeeds. Playback emits the
/// scripted progress frames; with `hold_progress_open` the stream stays
/// open afterwards so playback never completes on its own.
pub struct FakeDevice {
    pub fail_capture_start: Option<DeviceFault>,
    pub fail_capture_stop: Option<DeviceFault>,
    pub playback_script: Vec<PlaybackProgress>,
    pub hold_progress_open: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
    capturing: Option<PathBuf>,
    playback_tx: Option<mpsc::Sender<PlaybackProgress>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            fail_capture_start: None,
            fail_capture_stop: None,
            playback_script: Vec::new(),
            hold_progress_open: false,
            calls: Arc::new(Mutex::new(Vec::new())),
            capturing: None,
            playback_tx: None,
        }
    }

    fn record_call(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl AudioDevice for FakeDevice {
    async fn start_capture(&mut self, target: &Path) -> Result<(), DeviceFault> {
        self.record_call(format!("start_capture {}", file_name(target)));
        if let Some(fault) = self.fail_capture_start.take() {
            return Err(fault);
        }
        std::fs::write(target, b"").map_err(|e| DeviceFault::Failed(e.to_string()))?;
        self.capturing = Some(target.to_path_buf());
        Ok(())
    }

    async fn stop_capture(&mut self) -> Result<(), DeviceFault> {
        self.record_call("stop_capture");
        if let Some(fault) = self.fail_capture_stop.take() {
            return Err(fault);
        }
        self.capturing = None;
        Ok(())
    }

    async fn start_playback(
        &mut self,
        source: &Path,
    ) -> Result<mpsc::Receiver<PlaybackProgress>, DeviceFault> {
        self.record_call(format!("start_playback {}", file_name(source)));
        let (tx, rx) = mpsc::channel(32);
        for frame in &self.playback_script {
            tx.try_send(*frame)
                .map_err(|e| DeviceFault::Failed(e.to_string()))?;
        }
        if self.hold_progress_open {
            self.playback_tx = Some(tx);
        }
        Ok(rx)
    }

    async fn stop_playback(&mut self) -> Result<(), DeviceFault> {
        self.record_call("stop_playback");
        self.playback_tx = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn progress(position_ms: u64, duration_ms: u64) -> PlaybackProgress {
    PlaybackProgress {
        position_ms,
        duration_ms,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
