use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Shared namespace unavailable: {0}")]
    NamespaceUnavailable(String),

    #[error("Invalid namespace identifier: {0}")]
    InvalidNamespace(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for ShareError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_as_display_string() {
        let err = ShareError::NamespaceUnavailable("group.test".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Shared namespace unavailable: group.test\"");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ShareError = io.into();
        assert!(matches!(err, ShareError::Io(_)));
    }
}
