use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory where recordings are read and written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub path: PathBuf,
}

/// Outcome of resolving the persisted location at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A persisted, still-valid location was restored
    Location(StorageLocation),
    /// Nothing usable is persisted; the caller must run a selection flow
    SelectionRequired,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    recordings_dir: PathBuf,
}

/// Resolves and persists the user-chosen recordings directory
///
/// The location survives restarts as a single JSON state file. It is only
/// ever overwritten by an explicit `select` call; `resolve` degrades to
/// `SelectionRequired` when the persisted directory vanished or stopped
/// being writable.
pub struct StorageLocationResolver {
    state_path: PathBuf,
    current: Option<StorageLocation>,
}

impl StorageLocationResolver {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            current: None,
        }
    }

    /// Restore the persisted location, re-validating it before use
    pub async fn resolve(&mut self) -> Result<Resolution> {
        let raw = match fs::read_to_string(&self.state_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no persisted storage location at {}", self.state_path.display());
                return Ok(Resolution::SelectionRequired);
            }
            Err(e) => return Err(e.into()),
        };

        let state: PersistedState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!("persisted storage state is unreadable, ignoring it: {}", e);
                return Ok(Resolution::SelectionRequired);
            }
        };

        if !is_writable_dir(&state.recordings_dir) {
            warn!(
                "persisted storage location {} is gone or not writable",
                state.recordings_dir.display()
            );
            return Ok(Resolution::SelectionRequired);
        }

        let location = StorageLocation {
            path: state.recordings_dir,
        };
        info!("restored storage location: {}", location.path.display());
        self.current = Some(location.clone());
        Ok(Resolution::Location(location))
    }

    /// Validate, persist and adopt a user-selected directory
    pub async fn select(&mut self, path: impl AsRef<Path>) -> Result<StorageLocation> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !is_writable_dir(path) {
            return Err(SessionError::InvalidLocation(path.to_path_buf()));
        }

        let location = StorageLocation {
            path: path.to_path_buf(),
        };
        self.persist(&location)?;

        info!("storage location selected: {}", location.path.display());
        self.current = Some(location.clone());
        Ok(location)
    }

    /// Currently adopted location, if any
    pub fn current(&self) -> Option<&StorageLocation> {
        self.current.as_ref()
    }

    fn persist(&self, location: &StorageLocation) -> Result<()> {
        let state = PersistedState {
            recordings_dir: location.path.clone(),
        };
        if let Some(parent) = self.state_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&state)
            .map_err(|e| SessionError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        fs::write(&self.state_path, raw)?;
        Ok(())
    }
}

/// A directory qualifies only if a probe file can actually be created in it
fn is_writable_dir(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let probe = path.join(".sleepair-write-probe");
    match fs::OpenOptions::new().create(true).write(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
