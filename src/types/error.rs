//! Error taxonomy

use thiserror::Error;

use crate::types::Action;

/// Unknown role value; fatal for the observer session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    #[error("FATAL: unknown role {0:?}, refusing to load")]
    Unknown(String),
}

/// Fetching from or commanding the authority failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("no authority address configured")]
    NotConfigured,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("authority answered with status {0}")]
    Status(u16),
    #[error("could not decode authority response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Status(status.as_u16())
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}

/// Persisted observer configuration could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no authority address configured")]
    NotConfigured,
    #[error("authority address is empty")]
    EmptyAddress,
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A local action was refused or could not be delivered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("role {0} cannot issue commands")]
    NotPermitted(crate::types::Role),
    #[error("{0} is cooling down")]
    Debounced(Action),
    #[error("no authority address configured")]
    NotConfigured,
    #[error(transparent)]
    Sync(#[from] SyncError),
}
