use crate::error::{AppError, Result};
use crate::models::TrackedEntity;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error};

/// Durable mirror of the tracked symbol list
///
/// The list is always written whole, never appended to.
pub trait SymbolListStorage: Send + Sync {
    fn load(&self) -> Result<Vec<TrackedEntity>>;
    fn save(&self, entities: &[TrackedEntity]) -> Result<()>;
}

/// JSON array of tracked entities in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SymbolListStorage for JsonFileStorage {
    /// A missing file is an empty list
    fn load(&self) -> Result<Vec<TrackedEntity>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No watchlist file yet");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            AppError::Parse(format!("invalid watchlist {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, entities: &[TrackedEntity]) -> Result<()> {
        let data = serde_json::to_string_pretty(entities)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write to temp, then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, data)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            error!(error = %e, path = %self.path.display(), "Failed to rename temp watchlist");
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), count = entities.len(), "Watchlist saved");
        Ok(())
    }
}

/// In-process storage, counts its saves
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entities: Mutex<Vec<TrackedEntity>>,
    saves: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new(entities: Vec<TrackedEntity>) -> Self {
        Self {
            entities: Mutex::new(entities),
            saves: Mutex::new(0),
        }
    }

    pub fn saved(&self) -> Vec<TrackedEntity> {
        self.entities
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl SymbolListStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<TrackedEntity>> {
        Ok(self.saved())
    }

    fn save(&self, entities: &[TrackedEntity]) -> Result<()> {
        let mut stored = self
            .entities
            .lock()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".to_string()))?;
        *stored = entities.to_vec();
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
