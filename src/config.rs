use crate::device::DeviceConfig;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub recorder: RecorderConfig,
    pub device: DeviceConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Where the persisted storage-location pointer lives
    pub state_path: PathBuf,
}

/// Recording naming scheme
#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    /// Filename prefix for new recordings
    pub file_prefix: String,
    /// The one audio extension the manager reads and writes
    pub extension: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            file_prefix: "sleep".to_string(),
            extension: "wav".to_string(),
        }
    }
}

/// Remote evaluation service endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    pub endpoint: String,
    pub history_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5179/avaliar_sono".to_string(),
            history_endpoint: "http://127.0.0.1:5179/listar_audios".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
