//! Player preferences
//!
//! Persisted through the save store alongside the best score.

use log::{info, warn};
use serde_json::Value;

use crate::persistence::{PersistenceError, SaveStore};

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Run fullscreen instead of windowed
    pub fullscreen: bool,
    /// Silence all audio
    pub muted: bool,
}

impl Settings {
    const FULLSCREEN_KEY: &'static str = "is_fullscreen";
    const MUTE_KEY: &'static str = "is_mute";

    /// Load settings from the store; missing or malformed keys use defaults
    pub fn load(store: &dyn SaveStore) -> Self {
        let defaults = Self::default();
        let settings = Self {
            fullscreen: read_flag(store, Self::FULLSCREEN_KEY).unwrap_or(defaults.fullscreen),
            muted: read_flag(store, Self::MUTE_KEY).unwrap_or(defaults.muted),
        };
        info!("Loaded settings: {settings:?}");
        settings
    }

    /// Write settings back. Returns true if anything changed.
    pub fn save(&self, store: &mut dyn SaveStore) -> Result<bool, PersistenceError> {
        let fullscreen = store.set(Self::FULLSCREEN_KEY, Value::Bool(self.fullscreen))?;
        let muted = store.set(Self::MUTE_KEY, Value::Bool(self.muted))?;
        if fullscreen || muted {
            info!("Settings saved");
        }
        Ok(fullscreen || muted)
    }
}

fn read_flag(store: &dyn SaveStore, key: &str) -> Option<bool> {
    let value = store.get(key)?;
    let flag = value.as_bool();
    if flag.is_none() {
        warn!("Ignoring malformed setting {key}: {value}");
    }
    flag
}
