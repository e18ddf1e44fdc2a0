//! Request/response surface the consuming application polls for pending
//! shares.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::SharedUrl;
use crate::storage::{PendingQueue, SharedStorage};

/// Which retrieval contract a relay answers.
///
/// Exactly one is live per relay. Requests belonging to the other one get
/// the not-implemented response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayDiscipline {
    /// `getSharedURLs` peeks at the whole list, `clearSharedURLs` empties it.
    #[default]
    Batch,
    /// `getSharedUrl` returns and removes the oldest pending URL.
    DrainSingle,
}

impl RelayDiscipline {
    pub fn accepts(self, request: RelayRequest) -> bool {
        matches!(
            (self, request),
            (RelayDiscipline::Batch, RelayRequest::GetSharedUrls)
                | (RelayDiscipline::Batch, RelayRequest::ClearSharedUrls)
                | (RelayDiscipline::DrainSingle, RelayRequest::GetSharedUrl)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayRequest {
    GetSharedUrl,
    GetSharedUrls,
    ClearSharedUrls,
}

impl RelayRequest {
    pub const ALL: [RelayRequest; 3] = [
        RelayRequest::GetSharedUrl,
        RelayRequest::GetSharedUrls,
        RelayRequest::ClearSharedUrls,
    ];

    /// Maps a bridge method name onto a request. Names are case-sensitive.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "getSharedUrl" => Some(RelayRequest::GetSharedUrl),
            "getSharedURLs" => Some(RelayRequest::GetSharedUrls),
            "clearSharedURLs" => Some(RelayRequest::ClearSharedUrls),
            _ => None,
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            RelayRequest::GetSharedUrl => "getSharedUrl",
            RelayRequest::GetSharedUrls => "getSharedURLs",
            RelayRequest::ClearSharedUrls => "clearSharedURLs",
        }
    }
}

impl fmt::Display for RelayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayResponse {
    Url(Option<SharedUrl>),
    Urls(Vec<SharedUrl>),
    Cleared,
    NotImplemented,
}

pub struct Relay<S> {
    queue: PendingQueue<S>,
    discipline: RelayDiscipline,
}

impl<S: SharedStorage> Relay<S> {
    pub fn new(queue: PendingQueue<S>, discipline: RelayDiscipline) -> Self {
        Self { queue, discipline }
    }

    pub fn discipline(&self) -> RelayDiscipline {
        self.discipline
    }

    pub fn queue(&self) -> &PendingQueue<S> {
        &self.queue
    }

    /// Answers a request by its method name; unknown names are not
    /// implemented.
    pub fn handle_method(&self, method: &str) -> RelayResponse {
        match RelayRequest::from_method(method) {
            Some(request) => self.handle(request),
            None => {
                debug!("relay: unknown method {:?}", method);
                RelayResponse::NotImplemented
            }
        }
    }

    pub fn handle(&self, request: RelayRequest) -> RelayResponse {
        if !self.discipline.accepts(request) {
            debug!("relay: {} not served under {:?}", request, self.discipline);
            return RelayResponse::NotImplemented;
        }

        match request {
            RelayRequest::GetSharedUrl => RelayResponse::Url(self.get_shared_url()),
            RelayRequest::GetSharedUrls => RelayResponse::Urls(self.get_shared_urls()),
            RelayRequest::ClearSharedUrls => {
                self.clear_shared_urls();
                RelayResponse::Cleared
            }
        }
    }

    /// Drain-single: oldest pending URL, removed on read. A consumer that
    /// fails after this call loses the item.
    pub fn get_shared_url(&self) -> Option<SharedUrl> {
        self.queue.pop_front()
    }

    /// Batch peek: the whole pending list, left in place.
    pub fn get_shared_urls(&self) -> Vec<SharedUrl> {
        self.queue.read_all()
    }

    pub fn clear_shared_urls(&self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryNamespace;

    fn url(s: &str) -> SharedUrl {
        SharedUrl::new(s).unwrap()
    }

    fn relay(discipline: RelayDiscipline) -> (Relay<MemoryNamespace>, PendingQueue<MemoryNamespace>) {
        let ns = MemoryNamespace::new();
        let producer = PendingQueue::new(ns.clone());
        (Relay::new(PendingQueue::new(ns), discipline), producer)
    }

    #[test]
    fn test_method_names_map_both_ways() {
        for request in RelayRequest::ALL {
            assert_eq!(RelayRequest::from_method(request.method()), Some(request));
        }
        assert_eq!(RelayRequest::from_method("getSharedURL"), None);
        assert_eq!(RelayRequest::from_method(""), None);
    }

    #[test]
    fn test_batch_peek_then_clear() {
        let (relay, producer) = relay(RelayDiscipline::Batch);
        assert_eq!(relay.discipline(), RelayDiscipline::Batch);
        producer.append(&url("https://a"));
        producer.append(&url("https://b"));

        let expected = vec![url("https://a"), url("https://b")];
        assert_eq!(relay.handle_method("getSharedURLs"), RelayResponse::Urls(expected.clone()));
        // Peeking does not consume.
        assert_eq!(relay.handle_method("getSharedURLs"), RelayResponse::Urls(expected));

        assert_eq!(relay.handle_method("clearSharedURLs"), RelayResponse::Cleared);
        assert_eq!(relay.handle_method("getSharedURLs"), RelayResponse::Urls(vec![]));
    }

    #[test]
    fn test_drain_single() {
        let (relay, producer) = relay(RelayDiscipline::DrainSingle);
        producer.append(&url("https://a"));

        assert_eq!(
            relay.handle_method("getSharedUrl"),
            RelayResponse::Url(Some(url("https://a")))
        );
        assert_eq!(relay.handle_method("getSharedUrl"), RelayResponse::Url(None));
    }

    #[test]
    fn test_other_discipline_is_not_implemented() {
        let (batch, _) = relay(RelayDiscipline::Batch);
        assert_eq!(batch.handle(RelayRequest::GetSharedUrl), RelayResponse::NotImplemented);

        let (drain, producer) = relay(RelayDiscipline::DrainSingle);
        producer.append(&url("https://a"));
        assert_eq!(drain.handle(RelayRequest::GetSharedUrls), RelayResponse::NotImplemented);
        assert_eq!(drain.handle(RelayRequest::ClearSharedUrls), RelayResponse::NotImplemented);
        // The refused clear left the item pending.
        assert_eq!(drain.queue().read_all(), vec![url("https://a")]);
    }

    #[test]
    fn test_unknown_method_is_not_implemented() {
        let (relay, _) = relay(RelayDiscipline::Batch);
        assert_eq!(relay.handle_method("deleteEverything"), RelayResponse::NotImplemented);
    }

    #[test]
    fn test_discipline_wire_names() {
        assert_eq!(serde_json::to_string(&RelayDiscipline::Batch).unwrap(), "\"batch\"");
        assert_eq!(
            serde_json::to_string(&RelayDiscipline::DrainSingle).unwrap(),
            "\"drainSingle\""
        );
    }
}
