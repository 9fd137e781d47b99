//! # Client Events
//!
//! A broadcast channel system for observing what the API client is doing:
//! requests going out, responses coming back, and pauses between pages.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

/// Query parameters whose values must never leave the process in events or logs.
const REDACTED_PARAMS: &[&str] = &["sk", "api_sig", "token"];

/// Request information for client events
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET, POST, etc.)
    pub method: String,
    /// The API method (`user.getRecentTracks`, ...)
    pub api_method: String,
    /// Query parameters as key-value pairs, with credentials redacted
    pub query_params: Vec<(String, String)>,
    /// Path without query parameters
    pub path: String,
}

impl RequestInfo {
    /// Create RequestInfo from a URL and HTTP method, redacting credentials.
    pub fn from_url_and_method(url: &http_types::Url, method: &str) -> Self {
        let query_params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let value = if REDACTED_PARAMS.contains(&k.as_ref()) {
                    "<redacted>".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), value)
            })
            .collect();

        let api_method = query_params
            .iter()
            .find(|(k, _)| k == "method")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        Self {
            method: method.to_string(),
            api_method,
            query_params,
            path: url.path().to_string(),
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        let mut desc = format!("{} {}", self.method, self.path);
        if !self.api_method.is_empty() {
            desc.push_str(&format!(" ({})", self.api_method));
        }
        if let Some((_, page)) = self.query_params.iter().find(|(k, _)| k == "page") {
            desc.push_str(&format!(" page={page}"));
        }
        desc
    }
}

/// Event type to describe internal HTTP client activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Response received
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// The pagination driver is pausing before the next page
    PageDelay {
        /// Page that will be requested after the pause
        next_page: u32,
        /// Total pages reported by the first page
        total_pages: u32,
        /// Length of the pause in milliseconds
        delay_ms: u64,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Shared event broadcasting state that persists across client clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_types::Url;

    #[test]
    fn test_request_info_redacts_credentials() {
        let url = Url::parse(
            "https://ws.audioscrobbler.com/2.0/?api_key=pub&sk=secret_sk&method=user.getRecentTracks&page=3&api_sig=abc",
        )
        .unwrap();
        let info = RequestInfo::from_url_and_method(&url, "GET");

        assert_eq!(info.path, "/2.0/");
        assert_eq!(info.api_method, "user.getRecentTracks");
        assert!(info
            .query_params
            .contains(&("sk".to_string(), "<redacted>".to_string())));
        assert!(info
            .query_params
            .contains(&("api_sig".to_string(), "<redacted>".to_string())));
        assert!(!format!("{info:?}").contains("secret_sk"));
        assert_eq!(
            info.short_description(),
            "GET /2.0/ (user.getRecentTracks) page=3"
        );
    }

    #[test]
    fn test_latest_event_is_kept_without_subscribers() {
        let broadcaster = SharedEventBroadcaster::new();
        assert!(broadcaster.latest_event().is_none());

        broadcaster.broadcast_event(ClientEvent::PageDelay {
            next_page: 2,
            total_pages: 5,
            delay_ms: 1000,
        });

        assert!(matches!(
            broadcaster.latest_event(),
            Some(ClientEvent::PageDelay { next_page: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let broadcaster = SharedEventBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast_event(ClientEvent::PageDelay {
            next_page: 3,
            total_pages: 4,
            delay_ms: 0,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ClientEvent::PageDelay {
                next_page: 3,
                total_pages: 4,
                delay_ms: 0,
            }
        );
    }
}
