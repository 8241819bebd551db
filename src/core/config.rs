//! Persisted observer configuration
//!
//! The authority address is the only durable setting. It is stored as
//! `{"api_address": "..."}` in a small JSON file; a missing file means the
//! observer is not configured.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::normalize_address;
use crate::types::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredConfig {
    api_address: String,
}

/// File-backed home of the authority address
#[derive(Debug, Clone)]
pub struct AddressStore {
    path: PathBuf,
}

impl AddressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored address, or `None` when never configured
    pub fn load(&self) -> Result<Option<String>, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredConfig = serde_json::from_str(&content)?;
        Ok(normalize_address(&stored.api_address).ok())
    }

    /// Like `load`, but a missing address is an error
    pub fn require(&self) -> Result<String, ConfigError> {
        self.load()?.ok_or(ConfigError::NotConfigured)
    }

    /// Persist a new address; returns the normalized form
    pub fn save(&self, address: &str) -> Result<String, ConfigError> {
        let api_address = normalize_address(address).map_err(|_| ConfigError::EmptyAddress)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&StoredConfig {
            api_address: api_address.clone(),
        })?;
        fs::write(&self.path, json)?;
        tracing::info!(path = %self.path.display(), address = %api_address, "authority address saved");
        Ok(api_address)
    }

    /// Forget the address
    pub fn clear(&self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "authority address cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
