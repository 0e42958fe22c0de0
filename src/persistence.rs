//! Whole-state snapshot and its JSON file store ("save everything" after each change).

use crate::models::{Competition, Competitor, Referee};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the application keeps: rosters and competitions with their pools and rounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub competitors: Vec<Competitor>,
    pub referees: Vec<Referee>,
    pub competitions: Vec<Competition>,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives every committed snapshot. Failures stay inside the sink.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: Arc<Snapshot>);
}

/// Pretty-printed JSON file holding one [`Snapshot`].
#[derive(Clone, Debug)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet. Unknown fields are ignored.
    pub fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Rename the current file to `<path>.corrupt-<utc timestamp>` and return the new path.
    /// Used when the file cannot be loaded, so later saves do not destroy it.
    pub fn set_aside(&self) -> Result<PathBuf, PersistenceError> {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        let backup = PathBuf::from(name);
        fs::rename(&self.path, &backup)?;
        Ok(backup)
    }

    /// Write to a sibling temp file, then rename over the target.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SnapshotSink for JsonStore {
    fn persist(&self, snapshot: Arc<Snapshot>) {
        if let Err(e) = self.save(&snapshot) {
            log::error!("Failed to save {}: {}", self.path.display(), e);
        }
    }
}
