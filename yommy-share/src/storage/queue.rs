use tracing::{debug, warn};

use super::SharedStorage;
use crate::error::Result;
use crate::models::SharedUrl;

/// Default key holding the pending list inside the shared namespace.
pub const DEFAULT_SHARED_KEY: &str = "SharedURLs";

/// Ordered, duplicate-free list of pending URLs kept under one key.
///
/// Storage failures never reach the caller: writes become no-ops and reads
/// come back empty, with a warning logged.
#[derive(Debug, Clone)]
pub struct PendingQueue<S> {
    storage: S,
    key: String,
}

impl<S: SharedStorage> PendingQueue<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_SHARED_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Appends `url` unless an equal string is already pending.
    ///
    /// Returns whether the list changed. This is a plain read-modify-write:
    /// two processes appending at the same moment can lose one of the
    /// updates. The sharing surface and the main application are not
    /// expected to run at the same time, and no lock is taken.
    pub fn append(&self, url: &SharedUrl) -> bool {
        let mut urls = match self.load() {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Dropping shared URL, namespace unavailable: {}", e);
                return false;
            }
        };

        if urls.contains(url) {
            debug!("Shared URL already pending: {}", url);
            return false;
        }

        urls.push(url.clone());
        match self.persist(&urls) {
            Ok(()) => {
                debug!("Queued shared URL ({} pending): {}", urls.len(), url);
                true
            }
            Err(e) => {
                warn!("Failed to persist shared URL: {}", e);
                false
            }
        }
    }

    /// Current pending list, oldest first. Empty when nothing is stored or
    /// the namespace cannot be read.
    pub fn read_all(&self) -> Vec<SharedUrl> {
        self.load().unwrap_or_else(|e| {
            warn!("Failed to read pending shared URLs: {}", e);
            Vec::new()
        })
    }

    /// Removes the key entirely.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!("Failed to clear pending shared URLs: {}", e);
        }
    }

    /// Removes and returns the oldest pending URL.
    ///
    /// The key is removed once the list is empty. If the shortened list
    /// cannot be written back, nothing is returned so the item stays pending.
    pub fn pop_front(&self) -> Option<SharedUrl> {
        let mut urls = match self.load() {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Failed to read pending shared URLs: {}", e);
                return None;
            }
        };
        if urls.is_empty() {
            return None;
        }

        let first = urls.remove(0);
        let written = if urls.is_empty() {
            self.storage.remove(&self.key)
        } else {
            self.persist(&urls)
        };
        match written {
            Ok(()) => Some(first),
            Err(e) => {
                warn!("Failed to drain shared URL: {}", e);
                None
            }
        }
    }

    /// Reads the list. A value that is not a JSON array of strings counts as
    /// absent, so the next append overwrites it.
    fn load(&self) -> Result<Vec<SharedUrl>> {
        let Some(bytes) = self.storage.read(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(values) => Ok(values.into_iter().filter_map(SharedUrl::new).collect()),
            Err(e) => {
                warn!("Ignoring undecodable value under {}: {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    fn persist(&self, urls: &[SharedUrl]) -> Result<()> {
        let bytes = serde_json::to_vec(urls)?;
        self.storage.write(&self.key, &bytes)
    }
}
