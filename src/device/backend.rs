use crate::error::SessionError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// Playback position report emitted by a device while a file is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackProgress {
    /// Current position in milliseconds
    pub position_ms: u64,
    /// Total duration of the source in milliseconds
    pub duration_ms: u64,
}

/// Failure modes reported by an audio device
#[derive(Error, Debug, Clone)]
pub enum DeviceFault {
    /// Capture permission was not granted to the process
    #[error("capture permission has not been granted")]
    PermissionDenied,

    /// The device is already busy with another capture or playback
    #[error("device is busy")]
    Busy,

    /// Any other device-level failure
    #[error("{0}")]
    Failed(String),
}

impl From<DeviceFault> for SessionError {
    fn from(fault: DeviceFault) -> Self {
        match fault {
            DeviceFault::PermissionDenied => SessionError::PermissionDenied,
            other => SessionError::Device(other.to_string()),
        }
    }
}

/// Configuration for an audio device
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Which device implementation to create
    pub source: DeviceSource,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Capture frame / playback progress cadence in milliseconds
    pub tick_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            source: DeviceSource::Loopback,
            sample_rate: 16000,
            channels: 1,
            tick_ms: 100,
        }
    }
}

/// Device implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSource {
    /// Software loopback device (WAV files, no hardware)
    Loopback,
    /// Platform microphone input
    Microphone,
}

/// Audio capture and playback capability
///
/// The session state machines own the single-active-session invariants;
/// implementations only have to start and stop honestly and report faults.
/// `start_playback` hands back a progress stream the caller monitors for
/// completion.
#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Begin capturing audio into the given file
    async fn start_capture(&mut self, target: &Path) -> Result<(), DeviceFault>;

    /// Finalize the in-progress capture
    async fn stop_capture(&mut self) -> Result<(), DeviceFault>;

    /// Begin playing the given file, returning its progress stream
    async fn start_playback(
        &mut self,
        source: &Path,
    ) -> Result<mpsc::Receiver<PlaybackProgress>, DeviceFault>;

    /// Halt the in-progress playback
    async fn stop_playback(&mut self) -> Result<(), DeviceFault>;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// A device handle shared between the recorder and the playback controller
///
/// Mirrors the original app's single recorder/player object: one device,
/// one operation at a time, callers serialize by awaiting.
pub type SharedDevice = Arc<Mutex<Box<dyn AudioDevice>>>;

/// Wrap a device implementation into a shareable handle
pub fn share(device: impl AudioDevice + 'static) -> SharedDevice {
    Arc::new(Mutex::new(Box::new(device)))
}

/// Audio device factory
pub struct DeviceFactory;

impl DeviceFactory {
    /// Create a device based on the configured source
    pub fn create(config: DeviceConfig) -> Result<SharedDevice, DeviceFault> {
        match config.source {
            DeviceSource::Loopback => Ok(share(super::loopback::LoopbackDevice::new(config))),
            DeviceSource::Microphone => Err(DeviceFault::Failed(
                "microphone capture requires a platform audio backend".to_string(),
            )),
        }
    }
}
