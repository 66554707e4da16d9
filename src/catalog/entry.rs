use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A single persisted recording
///
/// Identity is the path: renaming produces a successor entity and the old
/// reference becomes invalid. `created_at` is derived from the filesystem
/// modification time, which is also the catalog's sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
}

impl Recording {
    /// Build an entry for a path, taking the timestamp from the filesystem
    /// when the file is present
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let created_at = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        let display_name = display_name_of(&path);
        Self {
            path,
            created_at,
            display_name,
        }
    }
}

/// File name portion of a recording path, for user-facing lists
pub fn display_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
