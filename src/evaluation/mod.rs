//! Remote sleep-evaluation submission
//!
//! Wire protocol follows the evaluation service: a multipart `POST` with the
//! audio bytes under the `audio` field, answered with a classification
//! string and a snoring percentage; a separate read endpoint lists past
//! evaluations.

mod client;
mod result;

pub use client::EvaluationSubmitter;
pub use result::{
    EvaluationRecord, EvaluationResult, SleepClassification, HEALTHY_LABEL, UNHEALTHY_LABEL,
};
