//! Sharing-side entry points: turn share notifications into queued URLs.

use tracing::{debug, info};
use url::Url;

use crate::extract::{extract, extract_from_text};
use crate::models::{Attachment, ExtensionItem, RawShareInput, ShareIntent, ShareOutcome, SharedUrl};
use crate::storage::{PendingQueue, SharedStorage};

pub struct IntakeSurface<S> {
    queue: PendingQueue<S>,
    handoff_url: String,
}

impl<S: SharedStorage> IntakeSurface<S> {
    pub fn new(queue: PendingQueue<S>, handoff_url: impl Into<String>) -> Self {
        Self {
            queue,
            handoff_url: handoff_url.into(),
        }
    }

    pub fn queue(&self) -> &PendingQueue<S> {
        &self.queue
    }

    /// Extracts a URL and queues it. Returns the URL when one was found,
    /// including when it was already pending.
    pub fn handle_input(&self, input: &RawShareInput) -> Option<SharedUrl> {
        let url = extract(input)?;
        self.store(url)
    }

    /// Handles a "send text" or "view/open" notification.
    pub fn handle_intent(&self, intent: ShareIntent) -> Option<SharedUrl> {
        match intent.into_raw_input() {
            Some(input) => self.handle_input(&input),
            None => {
                debug!("intake: intent carries nothing to extract");
                None
            }
        }
    }

    /// Handles a share-extension request.
    ///
    /// Only the first attachment that is a URL or plain text is looked at,
    /// scanning items then attachments in order.
    pub fn handle_extension(&self, items: &[ExtensionItem]) -> ShareOutcome {
        let first = items
            .iter()
            .flat_map(|item| item.attachments.iter())
            .find(|attachment| !matches!(attachment, Attachment::Other(_)));

        let saved = match first {
            Some(Attachment::Url(value)) => SharedUrl::new(value.as_str()).and_then(|u| self.store(u)),
            Some(Attachment::PlainText(text)) => {
                url_from_plain_text(text).and_then(|u| self.store(u))
            }
            Some(Attachment::Other(_)) | None => None,
        };

        let handoff = saved.as_ref().map(|_| self.handoff_url.clone());
        ShareOutcome { saved, handoff }
    }

    fn store(&self, url: SharedUrl) -> Option<SharedUrl> {
        if self.queue.append(&url) {
            info!("intake: queued shared URL {}", url);
        }
        Some(url)
    }
}

/// Text that is itself an absolute URL is kept whole; anything else goes
/// through the extractor. The URL parser tolerates inner spaces, so any
/// whitespace disqualifies the whole-text path.
fn url_from_plain_text(text: &str) -> Option<SharedUrl> {
    if !text.contains(char::is_whitespace) && Url::parse(text).is_ok() {
        return SharedUrl::new(text);
    }
    extract_from_text(text)
}
