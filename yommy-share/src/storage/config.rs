use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::queue::DEFAULT_SHARED_KEY;
use crate::error::{Result, ShareError};
use crate::relay::RelayDiscipline;

pub const DEFAULT_APP_GROUP_ID: &str = "group.com.example.yommy";
pub const DEFAULT_CHANNEL: &str = "com.example.yommy/share";
pub const DEFAULT_HANDOFF_URL: &str = "yommy://share";

/// Directory name used under the platform data directory.
const DATA_DIR_NAME: &str = "yommy-share";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareSettings {
    /// Identifier of the namespace shared by the extension and the app.
    pub app_group_id: String,
    /// Key holding the pending list inside the namespace.
    pub shared_key: String,
    /// Bridge channel the relay answers on.
    pub channel: String,
    /// Deep link opened after a share to bring the main app forward.
    pub handoff_url: String,
    pub discipline: RelayDiscipline,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            app_group_id: DEFAULT_APP_GROUP_ID.to_string(),
            shared_key: DEFAULT_SHARED_KEY.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            handoff_url: DEFAULT_HANDOFF_URL.to_string(),
            discipline: RelayDiscipline::default(),
        }
    }
}

/// Platform data directory for the shared namespaces.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or_else(|| ShareError::Config("Could not determine data directory".into()))
}

/// Loads settings from `path`, falling back to defaults when it does not
/// exist.
pub fn load_settings(path: &Path) -> Result<ShareSettings> {
    if !path.exists() {
        return Ok(ShareSettings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: ShareSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &ShareSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, ShareSettings::default());
        assert_eq!(settings.shared_key, "SharedURLs");
        assert_eq!(settings.discipline, RelayDiscipline::Batch);
    }

    #[test]
    fn test_partial_file_is_filled_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"app_group_id":"group.other","discipline":"drainSingle","extra":1}"#)
            .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.app_group_id, "group.other");
        assert_eq!(settings.discipline, RelayDiscipline::DrainSingle);
        assert_eq!(settings.channel, DEFAULT_CHANNEL);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = ShareSettings {
            handoff_url: "custom://open".into(),
            ..ShareSettings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(ShareError::Serialization(_))
        ));
    }
}
