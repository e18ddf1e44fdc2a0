use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::SharedStorage;
use crate::error::{Result, ShareError};

/// In-process namespace. Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct MemoryNamespace {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryNamespace {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MemoryNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail as if the namespace could not
    /// be opened (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ShareError::NamespaceUnavailable(
                "in-memory namespace disabled".into(),
            ));
        }
        self.entries
            .lock()
            .map_err(|_| ShareError::Storage("in-memory namespace poisoned".into()))
    }
}

impl SharedStorage for MemoryNamespace {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = MemoryNamespace::new();
        let b = a.clone();
        a.write("k", b"v").unwrap();
        assert_eq!(b.read("k").unwrap().as_deref(), Some(&b"v"[..]));
        b.remove("k").unwrap();
        assert_eq!(a.read("k").unwrap(), None);
    }

    #[test]
    fn test_unavailable() {
        let ns = MemoryNamespace::new();
        ns.set_available(false);
        assert!(matches!(
            ns.read("k"),
            Err(ShareError::NamespaceUnavailable(_))
        ));
        ns.set_available(true);
        assert_eq!(ns.read("k").unwrap(), None);
    }
}
