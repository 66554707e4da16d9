// Integration tests for the evaluation submitter.
//
// A throwaway axum server on an ephemeral port stands in for the remote
// evaluation service; the unreachable-endpoint cases talk to a port that
// was bound and then released.

mod common;

use anyhow::Result;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::FakeDevice;
use serde_json::{json, Value};
use sleepair_recorder::{
    share, EvaluationConfig, EvaluationSubmitter, Recording, RecorderConfig, RecordingLifecycle,
    SessionError, SleepClassification, StorageLocation,
};
use std::fs;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

async fn spawn_service(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve test app");
    });
    addr
}

/// An address nothing is listening on
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

fn submitter_for(addr: SocketAddr) -> EvaluationSubmitter {
    EvaluationSubmitter::new(EvaluationConfig {
        endpoint: format!("http://{}/avaliar_sono", addr),
        history_endpoint: format!("http://{}/listar_audios", addr),
        timeout_secs: 5,
    })
}

fn recording_in(temp: &TempDir, name: &str) -> Result<Recording> {
    let path = temp.path().join(name);
    fs::write(&path, b"fake audio bytes")?;
    Ok(Recording::from_path(path))
}

fn evaluation_route(body: Value) -> Router {
    Router::new().route("/avaliar_sono", post(move || async move { Json(body) }))
}

#[tokio::test]
async fn submit_parses_a_healthy_verdict_with_string_percent() -> Result<()> {
    let temp = TempDir::new()?;
    let addr = spawn_service(evaluation_route(json!({
        "resultado": "Sono possivelmente saudável.",
        "percent_ronco": "12.5",
    })))
    .await;

    let recording = recording_in(&temp, "night.wav")?;
    let result = submitter_for(addr).submit(Some(&recording)).await?;

    assert_eq!(result.classification, SleepClassification::Healthy);
    assert_eq!(result.percent_metric, 12.5);
    assert_eq!(result.source, recording.path);
    assert_eq!(result.server_id, None);

    Ok(())
}

#[tokio::test]
async fn submit_parses_an_unhealthy_verdict_with_numeric_percent_and_id() -> Result<()> {
    let temp = TempDir::new()?;
    let addr = spawn_service(evaluation_route(json!({
        "resultado": "Sono possivelmente não saudável.",
        "percent_ronco": 37.5,
        "id": 7,
    })))
    .await;

    let recording = recording_in(&temp, "night.wav")?;
    let result = submitter_for(addr).submit(Some(&recording)).await?;

    assert_eq!(result.classification, SleepClassification::Unhealthy);
    assert_eq!(result.percent_metric, 37.5);
    assert_eq!(result.server_id, Some("7".to_string()));

    Ok(())
}

#[tokio::test]
async fn submit_sends_a_multipart_form() -> Result<()> {
    let temp = TempDir::new()?;
    let seen_content_type: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let seen = seen_content_type.clone();

    let router = Router::new().route(
        "/avaliar_sono",
        post(move |headers: HeaderMap| {
            let seen = seen.clone();
            async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.to_string());
                *seen.lock().unwrap() = content_type;
                Json(json!({
                    "resultado": "Sono possivelmente saudável.",
                    "percent_ronco": 0,
                }))
            }
        }),
    );
    let addr = spawn_service(router).await;

    let recording = recording_in(&temp, "night.wav")?;
    submitter_for(addr).submit(Some(&recording)).await?;

    let content_type = seen_content_type.lock().unwrap().clone();
    assert!(
        content_type
            .as_deref()
            .is_some_and(|v| v.starts_with("multipart/form-data")),
        "expected a multipart upload, got {content_type:?}"
    );

    Ok(())
}

#[tokio::test]
async fn submit_without_a_target_is_rejected() {
    let submitter = EvaluationSubmitter::new(EvaluationConfig::default());
    let err = submitter.submit(None).await.unwrap_err();
    assert!(matches!(err, SessionError::NoRecordingSelected));
}

#[tokio::test]
async fn submit_of_a_deleted_recording_reports_the_missing_source() -> Result<()> {
    let temp = TempDir::new()?;
    let recording = recording_in(&temp, "gone.wav")?;
    fs::remove_file(&recording.path)?;

    let submitter = EvaluationSubmitter::new(EvaluationConfig::default());
    let err = submitter.submit(Some(&recording)).await.unwrap_err();
    assert!(matches!(err, SessionError::SourceMissing(_)));

    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error_and_recording_still_works() -> Result<()> {
    let temp = TempDir::new()?;
    let addr = dead_addr().await;

    let recording = recording_in(&temp, "night.wav")?;
    let err = submitter_for(addr).submit(Some(&recording)).await.unwrap_err();
    assert!(matches!(err, SessionError::Network(_)));

    // The failure is isolated: the lifecycle can start a recording right away.
    let lifecycle = RecordingLifecycle::new(share(FakeDevice::new()), RecorderConfig::default());
    let loc = StorageLocation {
        path: temp.path().to_path_buf(),
    };
    lifecycle.start(Some(&loc)).await?;
    lifecycle.stop().await?;

    Ok(())
}

#[tokio::test]
async fn server_error_status_maps_to_a_network_error() -> Result<()> {
    let temp = TempDir::new()?;
    let router = Router::new().route(
        "/avaliar_sono",
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Modelo não carregado."})),
            )
        }),
    );
    let addr = spawn_service(router).await;

    let recording = recording_in(&temp, "night.wav")?;
    let err = submitter_for(addr).submit(Some(&recording)).await.unwrap_err();
    assert!(matches!(err, SessionError::Network(_)));

    Ok(())
}

#[tokio::test]
async fn unknown_classification_is_an_invalid_response() -> Result<()> {
    let temp = TempDir::new()?;
    let addr = spawn_service(evaluation_route(json!({
        "resultado": "Sem dados suficientes.",
        "percent_ronco": 10,
    })))
    .await;

    let recording = recording_in(&temp, "night.wav")?;
    let err = submitter_for(addr).submit(Some(&recording)).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidResponse(_)));

    Ok(())
}

#[tokio::test]
async fn out_of_range_percent_is_an_invalid_response() -> Result<()> {
    let temp = TempDir::new()?;
    let addr = spawn_service(evaluation_route(json!({
        "resultado": "Sono possivelmente saudável.",
        "percent_ronco": "120",
    })))
    .await;

    let recording = recording_in(&temp, "night.wav")?;
    let err = submitter_for(addr).submit(Some(&recording)).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidResponse(_)));

    Ok(())
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() -> Result<()> {
    let temp = TempDir::new()?;
    let router = Router::new().route("/avaliar_sono", post(|| async { "not json" }));
    let addr = spawn_service(router).await;

    let recording = recording_in(&temp, "night.wav")?;
    let err = submitter_for(addr).submit(Some(&recording)).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidResponse(_)));

    Ok(())
}

#[tokio::test]
async fn history_parses_rows_with_mixed_field_types() -> Result<()> {
    let router = Router::new().route(
        "/listar_audios",
        get(|| async {
            Json(json!([
                {"id": 1, "name": "night1.wav", "resultado": "Sono possivelmente saudável.", "percent_ronco": "3.5"},
                {"id": "a1b2", "name": "night2.wav", "resultado": "Sono possivelmente não saudável.", "percent_ronco": 42},
            ]))
        }),
    );
    let addr = spawn_service(router).await;

    let records = submitter_for(addr).history().await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[0].name, "night1.wav");
    assert_eq!(records[0].percent, 3.5);
    assert_eq!(records[1].id, "a1b2");
    assert_eq!(records[1].result, "Sono possivelmente não saudável.");
    assert_eq!(records[1].percent, 42.0);

    Ok(())
}

#[tokio::test]
async fn history_with_an_unexpected_shape_is_an_invalid_response() -> Result<()> {
    let router = Router::new().route(
        "/listar_audios",
        get(|| async { Json(json!({"rows": []})) }),
    );
    let addr = spawn_service(router).await;

    let err = submitter_for(addr).history().await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidResponse(_)));

    Ok(())
}
