use super::entry::{display_name_of, Recording};
use crate::error::{Result, SessionError};
use crate::storage::StorageLocation;
use chrono::{DateTime, Utc};
use std::fs;
use tracing::{info, warn};

/// Pull-based view over the recordings in a storage location
///
/// The filesystem is the source of truth: nothing is cached, and callers
/// re-list after every mutation. Mutating operations re-validate existence
/// instead of trusting a possibly stale listing.
pub struct RecordingCatalog {
    extension: String,
}

impl RecordingCatalog {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Enumerate recordings, most recently modified first
    ///
    /// Ties on the modification time break by path ascending so the order
    /// is deterministic.
    pub async fn list(&self, location: &StorageLocation) -> Result<Vec<Recording>> {
        let mut recordings = Vec::new();

        for entry in fs::read_dir(&location.path)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            recordings.push(Recording {
                display_name: display_name_of(&path),
                created_at: DateTime::<Utc>::from(modified),
                path,
            });
        }

        recordings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.path.cmp(&b.path))
        });

        Ok(recordings)
    }

    /// Move a recording to a new base name within its directory
    ///
    /// The returned `Recording` is the successor entity; the argument
    /// reference is invalid afterwards.
    pub async fn rename(&self, recording: &Recording, new_base_name: &str) -> Result<Recording> {
        let trimmed = new_base_name.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyName);
        }

        if !recording.path.is_file() {
            return Err(SessionError::NotFound(recording.path.clone()));
        }

        let parent = recording
            .path
            .parent()
            .ok_or_else(|| SessionError::NotFound(recording.path.clone()))?;
        let target = parent.join(format!("{}.{}", trimmed, self.extension));

        if target.exists() {
            return Err(SessionError::NameCollision(display_name_of(&target)));
        }

        fs::rename(&recording.path, &target)?;
        info!(
            "renamed {} -> {}",
            recording.path.display(),
            target.display()
        );

        Ok(Recording::from_path(target))
    }

    /// Remove a recording's file
    ///
    /// Deleting an already-absent recording is a success, not an error.
    pub async fn delete(&self, recording: &Recording) -> Result<()> {
        if !recording.path.exists() {
            warn!(
                "recording {} already absent, treating delete as done",
                recording.path.display()
            );
            return Ok(());
        }

        fs::remove_file(&recording.path)?;
        info!("deleted recording {}", recording.path.display());
        Ok(())
    }
}
