use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Classification labels used by the evaluation service
pub const HEALTHY_LABEL: &str = "Sono possivelmente saudável.";
pub const UNHEALTHY_LABEL: &str = "Sono possivelmente não saudável.";

/// Verdict returned by the evaluation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepClassification {
    Healthy,
    Unhealthy,
}

/// Result of submitting a recording for evaluation; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// The recording the evaluation refers to
    pub source: PathBuf,
    pub classification: SleepClassification,
    /// Share of snoring segments, 0 to 100
    pub percent_metric: f64,
    /// Server-side identifier, when the service includes one
    pub server_id: Option<String>,
}

/// One row of the remote evaluation history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub name: String,
    pub result: String,
    pub percent: f64,
}

/// Wire shape of a successful evaluation response
#[derive(Debug, Deserialize)]
struct EvaluationResponse {
    resultado: String,
    percent_ronco: Value,
    #[serde(default)]
    id: Option<Value>,
}

/// Wire shape of one history row
#[derive(Debug, Deserialize)]
struct HistoryRow {
    id: Value,
    name: String,
    resultado: String,
    percent_ronco: Value,
}

pub(crate) fn parse_evaluation(source: &Path, body: Value) -> Result<EvaluationResult> {
    let response: EvaluationResponse = serde_json::from_value(body)
        .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

    let classification = match response.resultado.as_str() {
        HEALTHY_LABEL => SleepClassification::Healthy,
        UNHEALTHY_LABEL => SleepClassification::Unhealthy,
        other => {
            return Err(SessionError::InvalidResponse(format!(
                "unknown classification {:?}",
                other
            )))
        }
    };

    let percent_metric = percent_from(&response.percent_ronco)?;

    Ok(EvaluationResult {
        source: source.to_path_buf(),
        classification,
        percent_metric,
        server_id: response.id.as_ref().map(opaque_id),
    })
}

pub(crate) fn parse_history(body: Value) -> Result<Vec<EvaluationRecord>> {
    let rows: Vec<HistoryRow> = serde_json::from_value(body)
        .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

    rows.into_iter()
        .map(|row| {
            Ok(EvaluationRecord {
                id: opaque_id(&row.id),
                name: row.name,
                result: row.resultado,
                percent: percent_from(&row.percent_ronco)?,
            })
        })
        .collect()
}

/// The service reports the percentage either as a number or as a numeric
/// string; both must land in [0, 100]
fn percent_from(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(p) if (0.0..=100.0).contains(&p) => Ok(p),
        Some(p) => Err(SessionError::InvalidResponse(format!(
            "percentage {} outside [0, 100]",
            p
        ))),
        None => Err(SessionError::InvalidResponse(format!(
            "unparseable percentage {}",
            value
        ))),
    }
}

/// Ids arrive as numbers or strings depending on the backend; keep them opaque
fn opaque_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
