use std::fmt;

use serde::{Deserialize, Serialize};

/// A URL string handed over by a share action.
///
/// Kept as the original string; it is never parsed into components, and
/// equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedUrl(String);

impl SharedUrl {
    /// Wraps a non-empty string. Empty input yields `None`.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SharedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SharedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw content received from a share action, before extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RawShareInput {
    /// A URL object, already validated by the sender.
    Url(String),
    /// Free text that may contain a URL.
    Text(String),
}

/// MIME type a "send" notification must carry for its text to be read.
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// Notification delivered by the OS share dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ShareIntent {
    /// "Send text" with a MIME type marker.
    #[serde(rename_all = "camelCase")]
    Send {
        mime_type: Option<String>,
        text: Option<String>,
    },
    /// "View/open" carrying a URL directly.
    View { data: Option<String> },
    /// Any action we do not handle (launcher, main, ...).
    Other { name: String },
}

impl ShareIntent {
    /// Maps the notification onto extractor input.
    ///
    /// Text is only read when the MIME marker is exactly `text/plain`.
    pub fn into_raw_input(self) -> Option<RawShareInput> {
        match self {
            ShareIntent::Send {
                mime_type: Some(mime),
                text: Some(text),
            } if mime == PLAIN_TEXT_MIME => Some(RawShareInput::Text(text)),
            ShareIntent::Send { .. } => None,
            ShareIntent::View { data } => data.map(RawShareInput::Url),
            ShareIntent::Other { .. } => None,
        }
    }
}

/// One attachment of a share-extension item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Attachment {
    Url(String),
    PlainText(String),
    /// Anything else, identified by its type identifier (images, files, ...).
    Other(String),
}

/// An input item of a share-extension request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionItem {
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Result of handling one share-extension request.
///
/// The request always completes; `handoff` is the deep link the host should
/// open to wake the main application when something was saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOutcome {
    pub saved: Option<SharedUrl>,
    pub handoff: Option<String>,
}
