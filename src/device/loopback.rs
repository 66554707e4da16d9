use super::backend::{AudioDevice, DeviceConfig, DeviceFault, PlaybackProgress};
use async_trait::async_trait;
use hound::{WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Software loopback audio device
///
/// Captures by appending silence frames to a WAV file at a real-time cadence
/// and plays back by pacing progress reports against the file's duration.
/// Lets the session manager run end to end on machines without audio
/// hardware, and gives tests real files to work against.
pub struct LoopbackDevice {
    config: DeviceConfig,
    capture: Option<ActiveTask>,
    playback: Option<ActiveTask>,
}

struct ActiveTask {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), DeviceFault>>,
}

impl LoopbackDevice {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            capture: None,
            playback: None,
        }
    }

    fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.config.channels,
            sample_rate: self.config.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

#[async_trait]
impl AudioDevice for LoopbackDevice {
    async fn start_capture(&mut self, target: &Path) -> Result<(), DeviceFault> {
        if let Some(task) = &self.capture {
            if !task.handle.is_finished() {
                return Err(DeviceFault::Busy);
            }
            self.capture = None;
        }

        let writer = WavWriter::create(target, self.wav_spec())
            .map_err(|e| DeviceFault::Failed(format!("cannot create {}: {}", target.display(), e)))?;

        let samples_per_tick =
            (self.config.sample_rate as u64 * self.config.tick_ms / 1000) as usize
                * self.config.channels as usize;
        let tick = Duration::from_millis(self.config.tick_ms);
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = tokio::spawn(capture_task(writer, samples_per_tick, tick, stop_rx));
        self.capture = Some(ActiveTask { stop_tx, handle });

        info!("loopback capture started: {}", target.display());
        Ok(())
    }

    async fn stop_capture(&mut self) -> Result<(), DeviceFault> {
        let task = self
            .capture
            .take()
            .ok_or_else(|| DeviceFault::Failed("no capture in progress".to_string()))?;

        let _ = task.stop_tx.send(());
        task.handle
            .await
            .map_err(|e| DeviceFault::Failed(format!("capture task panicked: {}", e)))??;

        info!("loopback capture finalized");
        Ok(())
    }

    async fn start_playback(
        &mut self,
        source: &Path,
    ) -> Result<mpsc::Receiver<PlaybackProgress>, DeviceFault> {
        if let Some(task) = &self.playback {
            if !task.handle.is_finished() {
                return Err(DeviceFault::Busy);
            }
            self.playback = None;
        }

        let reader = WavReader::open(source)
            .map_err(|e| DeviceFault::Failed(format!("cannot open {}: {}", source.display(), e)))?;
        let spec = reader.spec();
        let frames = reader.len() as u64 / spec.channels as u64;
        let duration_ms = frames * 1000 / spec.sample_rate as u64;

        let tick = Duration::from_millis(self.config.tick_ms);
        let tick_ms = self.config.tick_ms;
        let (stop_tx, stop_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = mpsc::channel(32);

        let handle = tokio::spawn(playback_task(progress_tx, duration_ms, tick_ms, tick, stop_rx));
        self.playback = Some(ActiveTask { stop_tx, handle });

        info!(
            "loopback playback started: {} ({} ms)",
            source.display(),
            duration_ms
        );
        Ok(progress_rx)
    }

    async fn stop_playback(&mut self) -> Result<(), DeviceFault> {
        if let Some(task) = self.playback.take() {
            let _ = task.stop_tx.send(());
            match task.handle.await {
                Ok(result) => result?,
                Err(e) => warn!("playback task panicked: {}", e),
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "loopback"
    }
}

/// Appends silence frames until stopped, then finalizes the WAV header
async fn capture_task(
    mut writer: WavWriter<BufWriter<File>>,
    samples_per_tick: usize,
    tick: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<(), DeviceFault> {
    let mut interval = tokio::time::interval(tick);
    // The first tick fires immediately; skip it so a start/stop pair
    // produces an empty but valid file.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = interval.tick() => {
                for _ in 0..samples_per_tick {
                    writer
                        .write_sample(0i16)
                        .map_err(|e| DeviceFault::Failed(format!("write failed: {}", e)))?;
                }
            }
        }
    }

    writer
        .finalize()
        .map_err(|e| DeviceFault::Failed(format!("finalize failed: {}", e)))
}

/// Paces progress reports against the source duration
async fn playback_task(
    progress_tx: mpsc::Sender<PlaybackProgress>,
    duration_ms: u64,
    tick_ms: u64,
    tick: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<(), DeviceFault> {
    let mut position_ms = 0u64;
    let mut interval = tokio::time::interval(tick);
    interval.tick().await;

    loop {
        let report = PlaybackProgress {
            position_ms,
            duration_ms,
        };
        if progress_tx.send(report).await.is_err() {
            // Listener went away; nothing left to pace.
            return Ok(());
        }
        if position_ms >= duration_ms {
            return Ok(());
        }

        tokio::select! {
            _ = &mut stop_rx => return Ok(()),
            _ = interval.tick() => {
                position_ms = (position_ms + tick_ms).min(duration_ms);
            }
        }
    }
}
