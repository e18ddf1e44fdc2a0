//! JSON codec for the named bridge channel in front of the [`Relay`].
//!
//! One call in, one reply out. Nothing on this path panics or returns an
//! error: malformed input gets an `error` reply and unknown methods get
//! `notImplemented`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::SharedUrl;
use crate::relay::{Relay, RelayResponse};
use crate::storage::SharedStorage;

pub const BAD_CALL: &str = "BAD_CALL";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MethodCall {
    /// Target channel. Calls without one are taken to be for this channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            channel: None,
            method: method.into(),
            arguments: Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodReply {
    Success { result: Value },
    NotImplemented,
    Error { code: String, message: String },
}

impl From<RelayResponse> for MethodReply {
    fn from(response: RelayResponse) -> Self {
        let result = match response {
            RelayResponse::Url(url) => url.map(url_value).unwrap_or(Value::Null),
            RelayResponse::Urls(urls) => Value::Array(urls.into_iter().map(url_value).collect()),
            RelayResponse::Cleared => Value::Null,
            RelayResponse::NotImplemented => return MethodReply::NotImplemented,
        };
        MethodReply::Success { result }
    }
}

fn url_value(url: SharedUrl) -> Value {
    Value::String(url.into_string())
}

pub struct ShareChannel<S> {
    name: String,
    relay: Relay<S>,
}

impl<S: SharedStorage> ShareChannel<S> {
    pub fn new(name: impl Into<String>, relay: Relay<S>) -> Self {
        Self {
            name: name.into(),
            relay,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relay(&self) -> &Relay<S> {
        &self.relay
    }

    pub fn call(&self, call: &MethodCall) -> MethodReply {
        if let Some(channel) = call.channel.as_deref() {
            if channel != self.name {
                debug!("channel: call for {:?} ignored on {:?}", channel, self.name);
                return MethodReply::NotImplemented;
            }
        }
        self.relay.handle_method(&call.method).into()
    }

    /// Decodes one JSON call and encodes its reply.
    pub fn handle_json(&self, input: &str) -> String {
        let reply = match serde_json::from_str::<MethodCall>(input) {
            Ok(call) => self.call(&call),
            Err(e) => {
                warn!("channel: malformed call: {}", e);
                MethodReply::Error {
                    code: BAD_CALL.to_string(),
                    message: e.to_string(),
                }
            }
        };
        encode_reply(&reply)
    }

    /// Like [`handle_json`](Self::handle_json) for raw input; bytes that are
    /// not UTF-8 get a `BAD_CALL` reply.
    pub fn handle_bytes(&self, input: &[u8]) -> String {
        match std::str::from_utf8(input) {
            Ok(text) => self.handle_json(text),
            Err(e) => {
                warn!("channel: call is not valid UTF-8: {}", e);
                encode_reply(&MethodReply::Error {
                    code: BAD_CALL.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

pub fn encode_reply(reply: &MethodReply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|e| {
        warn!("channel: failed to encode reply: {}", e);
        format!(r#"{{"status":"error","code":"{}","message":"reply encoding failed"}}"#, BAD_CALL)
    })
}
