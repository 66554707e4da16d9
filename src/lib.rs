pub mod catalog;
pub mod config;
pub mod device;
pub mod error;
pub mod evaluation;
pub mod http;
pub mod session;
pub mod storage;

pub use catalog::{Recording, RecordingCatalog};
pub use config::{Config, EvaluationConfig, RecorderConfig};
pub use device::{
    share, AudioDevice, DeviceConfig, DeviceFactory, DeviceFault, DeviceSource, LoopbackDevice,
    PlaybackProgress, SharedDevice,
};
pub use error::{Result, SessionError};
pub use evaluation::{EvaluationRecord, EvaluationResult, EvaluationSubmitter, SleepClassification};
pub use http::{create_router, AppState};
pub use session::{PlaybackController, PlaybackEvent, RecordingLifecycle, SessionInfo};
pub use storage::{Resolution, StorageLocation, StorageLocationResolver};
