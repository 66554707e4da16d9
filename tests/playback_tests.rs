// Integration tests for the playback controller.
//
// One playback at a time, completion detected from the device's progress
// stream, user stops distinguished from auto-completion.

mod common;

use anyhow::Result;
use common::{progress, FakeDevice};
use sleepair_recorder::{
    share, PlaybackController, PlaybackEvent, Recording, SessionError,
};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn recording_in(temp: &TempDir, name: &str) -> Result<Recording> {
    let path = temp.path().join(name);
    fs::write(&path, b"audio")?;
    Ok(Recording::from_path(path))
}

fn controller_with(
    device: FakeDevice,
) -> (
    PlaybackController,
    mpsc::Receiver<PlaybackEvent>,
    Arc<Mutex<Vec<String>>>,
) {
    let calls = device.calls.clone();
    let (controller, events) = PlaybackController::new(share(device));
    (controller, events, calls)
}

async fn next_event(events: &mut mpsc::Receiver<PlaybackEvent>) -> PlaybackEvent {
    timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within deadline")
        .expect("event channel open")
}

#[tokio::test]
async fn play_missing_file_fails_and_stays_stopped() {
    let (controller, _events, _calls) = controller_with(FakeDevice::new());

    let ghost = Recording::from_path("/nonexistent/ghost.wav");
    let err = controller.play(&ghost).await.unwrap_err();

    assert!(matches!(err, SessionError::SourceMissing(_)));
    assert!(controller.current().await.is_none());
}

#[tokio::test]
async fn playback_completes_when_position_reaches_duration() -> Result<()> {
    let temp = TempDir::new()?;
    let mut device = FakeDevice::new();
    device.playback_script = vec![
        progress(0, 1_000),
        progress(500, 1_000),
        progress(1_000, 1_000),
    ];
    let (controller, mut events, calls) = controller_with(device);

    let recording = recording_in(&temp, "night.wav")?;
    controller.play(&recording).await?;

    // Progress is forwarded, then the completion event fires.
    assert_eq!(
        next_event(&mut events).await,
        PlaybackEvent::Progress {
            path: recording.path.clone(),
            position_ms: 0,
            duration_ms: 1_000
        }
    );
    assert_eq!(
        next_event(&mut events).await,
        PlaybackEvent::Progress {
            path: recording.path.clone(),
            position_ms: 500,
            duration_ms: 1_000
        }
    );
    let mut saw_completed = false;
    for _ in 0..2 {
        if let PlaybackEvent::Completed { path } = next_event(&mut events).await {
            assert_eq!(path, recording.path);
            saw_completed = true;
            break;
        }
    }
    assert!(saw_completed, "completion event must follow final progress");

    // Auto-completion settles the state machine and halts the device.
    assert!(controller.current().await.is_none());
    assert!(calls.lock().unwrap().iter().any(|c| c == "stop_playback"));

    Ok(())
}

#[tokio::test]
async fn user_stop_halts_without_a_completion_event() -> Result<()> {
    let temp = TempDir::new()?;
    let mut device = FakeDevice::new();
    device.playback_script = vec![progress(0, 60_000)];
    device.hold_progress_open = true;
    let (controller, mut events, calls) = controller_with(device);

    let recording = recording_in(&temp, "night.wav")?;
    controller.play(&recording).await?;
    assert_eq!(controller.current().await, Some(recording.path.clone()));

    controller.stop().await?;
    assert!(controller.current().await.is_none());
    assert!(calls.lock().unwrap().iter().any(|c| c == "stop_playback"));

    // Only progress was emitted; no Completed event for a user stop.
    while let Ok(Some(event)) = timeout(Duration::from_millis(100), events.recv()).await {
        assert!(
            matches!(event, PlaybackEvent::Progress { .. }),
            "unexpected event after user stop: {event:?}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn playing_a_second_recording_stops_the_first() -> Result<()> {
    let temp = TempDir::new()?;
    let mut device = FakeDevice::new();
    device.playback_script = vec![progress(0, 60_000)];
    device.hold_progress_open = true;
    let (controller, _events, calls) = controller_with(device);

    let first = recording_in(&temp, "first.wav")?;
    let second = recording_in(&temp, "second.wav")?;

    controller.play(&first).await?;
    controller.play(&second).await?;

    assert_eq!(controller.current().await, Some(second.path.clone()));

    let calls = calls.lock().unwrap();
    let sequence: Vec<&str> = calls.iter().map(|s| s.as_str()).collect();
    assert_eq!(
        sequence,
        vec![
            "start_playback first.wav",
            "stop_playback",
            "start_playback second.wav",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn stop_while_already_stopped_is_a_quiet_success() -> Result<()> {
    let (controller, _events, calls) = controller_with(FakeDevice::new());

    controller.stop().await?;

    // Nothing was playing, so the device was never touched.
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}
