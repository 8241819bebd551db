//! Client side of the authority's HTTP surface

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::api::Ack;
use crate::core::SignalStore;
use crate::types::{Action, Snapshot, SyncError};
use crate::{PATH_BROADCAST, PATH_PING, REQUEST_TIMEOUT_MS};

/// Anything an observer can read snapshots from and send commands to
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Fetch the current snapshot
    async fn fetch_snapshot(&self, address: &str) -> Result<Snapshot, SyncError>;

    /// Issue one command
    async fn send_command(&self, address: &str, action: Action) -> Result<(), SyncError>;

    /// Liveness probe
    async fn ping(&self, address: &str) -> Result<(), SyncError>;
}

/// Trim whitespace and trailing slashes from an operator-entered address
pub fn normalize_address(address: &str) -> Result<String, SyncError> {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SyncError::NotConfigured);
    }
    Ok(trimmed.to_string())
}

/// `reqwest`-backed authority client
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
}

impl HttpAuthority {
    /// Client with the default request timeout
    pub fn new() -> Result<Self, SyncError> {
        Self::with_timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn url(address: &str, path: &str) -> Result<String, SyncError> {
        Ok(format!("{}{}", normalize_address(address)?, path))
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthority {
    async fn fetch_snapshot(&self, address: &str) -> Result<Snapshot, SyncError> {
        let url = Self::url(address, PATH_BROADCAST)?;
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status().as_u16()));
        }
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode(e.to_string()))
    }

    async fn send_command(&self, address: &str, action: Action) -> Result<(), SyncError> {
        let url = Self::url(address, action.path())?;
        let resp = self.client.post(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status().as_u16()));
        }
        Ok(())
    }

    async fn ping(&self, address: &str) -> Result<(), SyncError> {
        let url = Self::url(address, PATH_PING)?;
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status().as_u16()));
        }
        let ack: Ack = resp.json().await?;
        if ack.ok {
            Ok(())
        } else {
            Err(SyncError::Decode("ping answered ok=false".to_string()))
        }
    }
}

/// In-process authority wrapping its own store
///
/// Serves observers living in the same process as the authority, and lets
/// callers simulate an unreachable authority with `set_offline`.
#[derive(Debug, Default)]
pub struct MemoryAuthority {
    store: Mutex<SignalStore>,
    offline: AtomicBool,
    fetches: AtomicU64,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command directly, bypassing the transport
    pub fn apply(&self, action: Action) -> Snapshot {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.apply(action.transition())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.lock().unwrap_or_else(|e| e.into_inner()).snapshot()
    }

    /// While offline every request fails with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot fetches served or refused so far
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Transport("authority unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorityClient for MemoryAuthority {
    async fn fetch_snapshot(&self, _address: &str) -> Result<Snapshot, SyncError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.snapshot())
    }

    async fn send_command(&self, _address: &str, action: Action) -> Result<(), SyncError> {
        self.check_online()?;
        self.apply(action);
        Ok(())
    }

    async fn ping(&self, _address: &str) -> Result<(), SyncError> {
        self.check_online()
    }
}
