//! Shared-namespace storage.
//!
//! Both the sharing surface and the consuming application talk to the same
//! namespace through a [`SharedStorage`] handle. Nothing here locks across
//! processes: see [`PendingQueue::append`] for the known race.

mod config;
mod file;
mod memory;
mod queue;

pub use config::{default_data_dir, load_settings, save_settings, ShareSettings};
pub use file::FileNamespace;
pub use memory::MemoryNamespace;
pub use queue::PendingQueue;

use crate::error::{Result, ShareError};

/// A durable key-value namespace holding opaque blobs under string keys.
pub trait SharedStorage {
    /// Returns the blob under `key`, or `None` when the key (or the whole
    /// namespace) does not exist yet.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces the blob under `key`, creating the namespace if needed.
    fn write(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: SharedStorage + ?Sized> SharedStorage for &S {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Namespace ids and keys end up as path components, so they must be plain
/// names.
pub(crate) fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty()
        || id == "."
        || id.contains("..")
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0')
    {
        return Err(ShareError::InvalidNamespace(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("group.com.example.yommy").is_ok());
        assert!(validate_identifier("SharedURLs").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b", "x..y"] {
            assert!(
                matches!(validate_identifier(bad), Err(ShareError::InvalidNamespace(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
