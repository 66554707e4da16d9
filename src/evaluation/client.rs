use super::result::{parse_evaluation, parse_history, EvaluationRecord, EvaluationResult};
use crate::catalog::Recording;
use crate::config::EvaluationConfig;
use crate::error::{Result, SessionError};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::info;

/// Client for the remote sleep-evaluation service
///
/// `submit` is the one network-bound operation in the manager. It never
/// blocks other components: recording can proceed while a submission is in
/// flight, and an abandoned submission simply runs to completion with its
/// result discarded. Failures are surfaced to the caller; there is no
/// automatic retry.
pub struct EvaluationSubmitter {
    client: reqwest::Client,
    config: EvaluationConfig,
}

impl EvaluationSubmitter {
    pub fn new(config: EvaluationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Upload a recording and parse the service's verdict
    pub async fn submit(&self, recording: Option<&Recording>) -> Result<EvaluationResult> {
        let recording = recording.ok_or(SessionError::NoRecordingSelected)?;

        let bytes = tokio::fs::read(&recording.path)
            .await
            .map_err(|_| SessionError::SourceMissing(recording.path.clone()))?;

        info!(
            "submitting {} ({} bytes) to {}",
            recording.display_name,
            bytes.len(),
            self.config.endpoint
        );

        let part = Part::bytes(bytes)
            .file_name(recording.display_name.clone())
            .mime_str(mime_for(&recording.path))
            .map_err(|e| SessionError::Network(e.to_string()))?;
        let form = Form::new().part("audio", part);

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::Network(format!(
                "evaluation service returned {}",
                response.status()
            )));
        }

        let body = response
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        let result = parse_evaluation(&recording.path, body)?;
        info!(
            "evaluation of {}: {:?} at {:.1}%",
            recording.display_name, result.classification, result.percent_metric
        );
        Ok(result)
    }

    /// Fetch the service's evaluation history
    pub async fn history(&self) -> Result<Vec<EvaluationRecord>> {
        let response = self
            .client
            .get(&self.config.history_endpoint)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::Network(format!(
                "evaluation service returned {}",
                response.status()
            )));
        }

        let body = response
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        parse_history(body)
    }
}

fn mime_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mp3",
        _ => "application/octet-stream",
    }
}
