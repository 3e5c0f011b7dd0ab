//! Save data as a small key-value store
//!
//! Features:
//! - `SaveStore` get/set interface, values are JSON
//! - In-memory store for tests and throwaway sessions
//! - JSON file store, written through a temp file on every change
//! - Corrupt or missing save files fall back to defaults

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::fixed::Fixed;

pub const BEST_SCORE_KEY: &str = "best_score";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save file I/O failed")]
    Io(#[from] io::Error),
    #[error("save data could not be encoded")]
    Json(#[from] serde_json::Error),
}

pub trait SaveStore {
    fn get(&self, key: &str) -> Option<&Value>;

    /// Store a value. Returns false if it was already equal.
    fn set(&mut self, key: &str, value: Value) -> Result<bool, PersistenceError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<bool, PersistenceError> {
        if self.values.get(key) == Some(&value) {
            return Ok(false);
        }
        self.values.insert(key.to_string(), value);
        Ok(true)
    }
}

/// Store backed by a JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Load `path`, starting empty if it is missing or unreadable as JSON
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => {
                    info!("Loaded save data from {}", path.display());
                    map
                }
                Ok(_) | Err(_) => {
                    warn!("Ignoring corrupt save file {}", path.display());
                    Map::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write everything to disk (tmp file, then rename over the save)
    pub fn save(&self) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SaveStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<bool, PersistenceError> {
        if self.values.get(key) == Some(&value) {
            return Ok(false);
        }
        self.values.insert(key.to_string(), value);
        self.save()?;
        Ok(true)
    }
}

/// Stored best score, zero if absent or unreadable
pub fn best_score(store: &dyn SaveStore) -> Fixed {
    store
        .get(BEST_SCORE_KEY)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(Fixed::ZERO)
}

/// Store `score` if it beats the current best. Returns true on a new best.
pub fn record_best_score(store: &mut dyn SaveStore, score: Fixed) -> Result<bool, PersistenceError> {
    if score <= best_score(store) {
        return Ok(false);
    }
    store.set(BEST_SCORE_KEY, serde_json::to_value(score)?)?;
    Ok(true)
}
