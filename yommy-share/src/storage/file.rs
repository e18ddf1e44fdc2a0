use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{validate_identifier, SharedStorage};
use crate::error::{Result, ShareError};

/// A namespace stored as a directory under a shared root, one JSON file per
/// key.
///
/// The namespace is opened on every operation, the way a suite-scoped
/// defaults store is, so a provisioning problem shows up as an error from the
/// individual call rather than from construction.
#[derive(Debug, Clone)]
pub struct FileNamespace {
    root: PathBuf,
    group_id: String,
}

impl FileNamespace {
    pub fn new(root: impl Into<PathBuf>, group_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            group_id: group_id.into(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Directory backing this namespace.
    pub fn dir(&self) -> Result<PathBuf> {
        validate_identifier(&self.group_id)?;
        Ok(self.root.join(&self.group_id))
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_identifier(key)?;
        Ok(self.dir()?.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<PathBuf> {
        let dir = self.dir()?;
        std::fs::create_dir_all(&dir).map_err(|e| {
            ShareError::NamespaceUnavailable(format!("{}: {}", dir.display(), e))
        })?;
        Ok(dir)
    }
}

impl SharedStorage for FileNamespace {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShareError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        let dir = self.ensure_dir()?;

        // Readers in the other process only ever see a complete list.
        let tmp = dir.join(format!(".{}.json.tmp", key));
        let replaced = std::fs::write(&tmp, value)
            .map_err(ShareError::from)
            .and_then(|()| restrict_permissions(&tmp))
            .and_then(|()| std::fs::rename(&tmp, &path).map_err(ShareError::from));
        if let Err(e) = replaced {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShareError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_namespace_is_none() {
        let dir = tempdir().unwrap();
        let ns = FileNamespace::new(dir.path(), "group.test");
        assert_eq!(ns.group_id(), "group.test");
        assert_eq!(ns.read("SharedURLs").unwrap(), None);
    }

    #[test]
    fn test_write_read_remove() {
        let dir = tempdir().unwrap();
        let ns = FileNamespace::new(dir.path(), "group.test");

        ns.write("SharedURLs", b"[\"https://a\"]").unwrap();
        assert!(dir.path().join("group.test").join("SharedURLs.json").exists());
        assert_eq!(
            ns.read("SharedURLs").unwrap().as_deref(),
            Some(&b"[\"https://a\"]"[..])
        );

        ns.remove("SharedURLs").unwrap();
        assert_eq!(ns.read("SharedURLs").unwrap(), None);
        // Second remove is still fine.
        ns.remove("SharedURLs").unwrap();
    }

    #[test]
    fn test_two_handles_see_the_same_namespace() {
        let dir = tempdir().unwrap();
        let writer = FileNamespace::new(dir.path(), "group.test");
        let reader = FileNamespace::new(dir.path(), "group.test");
        writer.write("k", b"[]").unwrap();
        assert!(reader.read("k").unwrap().is_some());
    }

    #[test]
    fn test_failed_replace_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let ns = FileNamespace::new(dir.path(), "group.test");
        // A non-empty directory where the key file should go makes the
        // rename fail after the temp file was written.
        let target = ns.dir().unwrap().join("k.json");
        std::fs::create_dir_all(target.join("inner")).unwrap();

        assert!(ns.write("k", b"[]").is_err());
        assert!(!ns.dir().unwrap().join(".k.json.tmp").exists());
    }

    #[test]
    fn test_unopenable_namespace() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let ns = FileNamespace::new(&blocker, "group.test");
        assert!(matches!(
            ns.write("k", b"[]"),
            Err(ShareError::NamespaceUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_group_id() {
        let dir = tempdir().unwrap();
        let ns = FileNamespace::new(dir.path(), "../escape");
        assert!(matches!(ns.read("k"), Err(ShareError::InvalidNamespace(_))));
        assert!(matches!(
            ns.write("k", b"[]"),
            Err(ShareError::InvalidNamespace(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let ns = FileNamespace::new(dir.path(), "group.test");
        ns.write("k", b"[]").unwrap();
        let mode = std::fs::metadata(ns.dir().unwrap().join("k.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
