//! Durable key-value storage
//!
//! Each key is one JSON document under the storage root (`<root>/<key>.json`).
//! Writes replace the whole document and go through a temp file + rename.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::seed::seed_events;
use crate::error::{AppError, Result};
use crate::models::{Event, Registration};

pub const EVENTS_KEY: &str = "events";
pub const REGISTRATIONS_KEY: &str = "registrations";
pub const ADMIN_FLAG_KEY: &str = "isAdminLoggedIn";

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::StateSave {
                path: self.root.display().to_string(),
                source: e,
            })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Read a key. Returns `None` when the key has never been written.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| AppError::StateParse {
                    path: path.display().to_string(),
                    source: e,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StateLoad {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Overwrite a key atomically
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let content = serde_json::to_string_pretty(value)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content)
            .await
            .map_err(|e| AppError::StateSave {
                path: path.display().to_string(),
                source: e,
            })?;

        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| AppError::StateSave {
                path: path.display().to_string(),
                source: e,
            })?;

        debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// Delete a key; deleting a missing key is not an error
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StateSave {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Load events, falling back to the built-in seed when none are stored
    pub async fn load_events(&self) -> Result<Vec<Event>> {
        Ok(self.get(EVENTS_KEY).await?.unwrap_or_else(seed_events))
    }

    pub async fn load_registrations(&self) -> Result<Vec<Registration>> {
        Ok(self.get(REGISTRATIONS_KEY).await?.unwrap_or_default())
    }

    pub async fn save_events(&self, events: &[Event]) -> Result<()> {
        self.set(EVENTS_KEY, events).await
    }

    pub async fn save_registrations(&self, registrations: &[Registration]) -> Result<()> {
        self.set(REGISTRATIONS_KEY, registrations).await
    }
}
