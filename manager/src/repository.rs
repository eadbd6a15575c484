//! Persistence of the last successful reconciliation snapshot.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::RepositoryError;
use crate::state::StakingSnapshot;

/// Storage for the snapshot shown while a new pass is loading or after it failed.
pub trait StateRepository: Send + Sync {
    fn load(&self) -> Result<Option<StakingSnapshot>, RepositoryError>;
    fn store(&self, snapshot: &StakingSnapshot) -> Result<(), RepositoryError>;
}

/// Keeps the snapshot for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryStateRepository {
    snapshot: Mutex<Option<StakingSnapshot>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateRepository for InMemoryStateRepository {
    fn load(&self) -> Result<Option<StakingSnapshot>, RepositoryError> {
        let snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(snapshot.clone())
    }

    fn store(&self, snapshot: &StakingSnapshot) -> Result<(), RepositoryError> {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        Ok(())
    }
}

/// Keeps the snapshot as a JSON document on disk, so it survives restarts.
pub struct JsonFileStateRepository {
    path: PathBuf,
}

impl JsonFileStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateRepository for JsonFileStateRepository {
    fn load(&self) -> Result<Option<StakingSnapshot>, RepositoryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    fn store(&self, snapshot: &StakingSnapshot) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write then rename so a crash never leaves a truncated snapshot.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
