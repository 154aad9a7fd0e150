//! Persistent settings backend.
//!
//! A small key-value store backed by a JSON file. The only setting the engine
//! reads is the countdown display flag, loaded once at startup and written on
//! every toggle.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{AutoreloadError, AutoreloadResult};

const COUNTDOWN_KEY: &str = "countdown";

/// JSON-file-backed key-value settings.
///
/// Data is cached in memory and written to disk on modification.
#[derive(Debug)]
pub struct SettingsStore {
    /// Path to the settings file.
    path: PathBuf,
    /// In-memory cache of stored values.
    cache: HashMap<String, Value>,
    /// Whether the cache has uncommitted changes.
    dirty: bool,
}

impl SettingsStore {
    /// Open the store in `settings_dir`.
    ///
    /// A missing or unreadable file starts out empty.
    pub fn open(settings_dir: &Path) -> Self {
        let path = settings_dir.join("settings.json");

        let cache = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt settings file");
                    HashMap::new()
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read settings");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            path,
            cache,
            dirty: false,
        }
    }

    /// An in-memory store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            cache: HashMap::new(),
            dirty: false,
        }
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cache.get(key)
    }

    /// Set a value. The value is immediately written to disk.
    pub fn set(&mut self, key: &str, value: Value) -> AutoreloadResult<()> {
        self.cache.insert(key.to_string(), value);
        self.dirty = true;
        self.flush()
    }

    /// Whether badges should show a live countdown. Defaults to `false`.
    pub fn countdown_enabled(&self) -> bool {
        self.get(COUNTDOWN_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_countdown_enabled(&mut self, enabled: bool) -> AutoreloadResult<()> {
        self.set(COUNTDOWN_KEY, Value::Bool(enabled))
    }

    /// Flush cached changes to disk.
    pub fn flush(&mut self) -> AutoreloadResult<()> {
        if !self.dirty || self.path.as_os_str().is_empty() {
            self.dirty = false;
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AutoreloadError::Settings {
                path: self.path.clone(),
                message: format!("cannot create directory: {}", e),
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.cache)?;
        fs::write(&self.path, contents).map_err(|e| AutoreloadError::Settings {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        self.dirty = false;
        Ok(())
    }
}

impl Drop for SettingsStore {
    fn drop(&mut self) {
        // Best-effort flush on drop
        let _ = self.flush();
    }
}
