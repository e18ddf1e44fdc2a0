//! Shared-URL intake and relay for the Yommy share sheet.
//!
//! Three roles that only meet through a shared namespace:
//!
//! - the extractor turns shared content (a URL or free text) into at most one URL,
//! - the [`PendingQueue`] keeps an ordered, duplicate-free list of pending URLs
//!   under a single key of a [`SharedStorage`] namespace,
//! - the [`Relay`] lets the main application fetch and clear that list, fronted
//!   by a JSON [`ShareChannel`].
//!
//! The sharing side runs through an [`IntakeSurface`], usually in another
//! process than the relay. Appends are not atomic across processes; two
//! simultaneous shares can lose one update.

pub mod channel;
pub mod error;
pub mod extract;
pub mod intake;
pub mod models;
pub mod relay;
pub mod storage;

use std::path::Path;

pub use channel::{MethodCall, MethodReply, ShareChannel};
pub use error::{Result, ShareError};
pub use extract::extract;
pub use intake::IntakeSurface;
pub use models::*;
pub use relay::{Relay, RelayDiscipline, RelayRequest, RelayResponse};
pub use storage::{
    FileNamespace, MemoryNamespace, PendingQueue, ShareSettings, SharedStorage,
};

/// Opens the file-backed namespace described by `settings` under `root`.
pub fn open_queue(root: &Path, settings: &ShareSettings) -> PendingQueue<FileNamespace> {
    PendingQueue::with_key(
        FileNamespace::new(root, settings.app_group_id.as_str()),
        settings.shared_key.as_str(),
    )
}

/// Sharing-side surface for `settings`.
pub fn intake_surface(root: &Path, settings: &ShareSettings) -> IntakeSurface<FileNamespace> {
    IntakeSurface::new(open_queue(root, settings), settings.handoff_url.as_str())
}

/// Consuming-side channel for `settings`.
pub fn share_channel(root: &Path, settings: &ShareSettings) -> ShareChannel<FileNamespace> {
    let relay = Relay::new(open_queue(root, settings), settings.discipline);
    ShareChannel::new(settings.channel.as_str(), relay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_share_then_poll_across_handles() {
        let dir = tempdir().unwrap();
        let settings = ShareSettings::default();

        let intake = intake_surface(dir.path(), &settings);
        intake.handle_intent(ShareIntent::View {
            data: Some("https://a.example".into()),
        });
        let outcome = intake.handle_extension(&[ExtensionItem {
            attachments: vec![Attachment::PlainText("see https://b.example".into())],
        }]);
        assert_eq!(outcome.handoff.as_deref(), Some("yommy://share"));

        let channel = share_channel(dir.path(), &settings);
        assert_eq!(
            channel.relay().get_shared_urls(),
            vec![
                SharedUrl::new("https://a.example").unwrap(),
                SharedUrl::new("https://b.example").unwrap(),
            ]
        );
        channel.relay().clear_shared_urls();
        assert!(channel.relay().get_shared_urls().is_empty());
    }
}
