//! Mock fetch capability for deterministic testing.
//!
//! Routes are matched by URL fragment, first match wins. Every call is
//! logged so tests can assert which endpoints were (or were not) hit.
//!
//! ## Usage
//!
//! ```rust
//! use casenote_client::mock::MockFetch;
//!
//! let mock = MockFetch::new()
//!     .with_response("CaseNoteList", 200, "[]")
//!     .with_transport_error("compId=broken", "connection reset");
//! assert!(mock.calls().is_empty());
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use casenote_core::{Error, Result};

use crate::fetch::{FetchResponse, RecordFetch};

#[derive(Debug, Clone)]
enum MockOutcome {
    Response { status: u16, body: String },
    Transport(String),
}

#[derive(Debug, Clone)]
struct MockRoute {
    fragment: String,
    outcome: MockOutcome,
}

/// Mock [`RecordFetch`] implementation.
#[derive(Clone, Default)]
pub struct MockFetch {
    routes: Arc<Vec<MockRoute>>,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockFetch {
    /// Create a mock with no routes; every request fails with a
    /// no-route error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any URL containing `fragment` with the given status and
    /// body.
    pub fn with_response(
        mut self,
        fragment: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.routes).push(MockRoute {
            fragment: fragment.into(),
            outcome: MockOutcome::Response {
                status,
                body: body.into(),
            },
        });
        self
    }

    /// Fail any URL containing `fragment` at the transport level.
    pub fn with_transport_error(
        mut self,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.routes).push(MockRoute {
            fragment: fragment.into(),
            outcome: MockOutcome::Transport(message.into()),
        });
        self
    }

    /// All URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of requests whose URL contains `fragment`.
    pub fn call_count(&self, fragment: &str) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl RecordFetch for MockFetch {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        self.call_log.lock().unwrap().push(url.to_string());
        for route in self.routes.iter() {
            if url.contains(&route.fragment) {
                return match &route.outcome {
                    MockOutcome::Response { status, body } => Ok(FetchResponse {
                        status: *status,
                        body: body.clone(),
                    }),
                    MockOutcome::Transport(message) => Err(Error::Request(message.clone())),
                };
            }
        }
        Err(Error::Request(format!("no mock route for {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_route_wins() {
        let mock = MockFetch::new()
            .with_response("view", 200, "first")
            .with_response("view", 500, "second");
        let response = mock.get("https://x.test/view").await.unwrap();
        assert_eq!(response.body, "first");
    }

    #[tokio::test]
    async fn test_unrouted_url_fails() {
        let mock = MockFetch::new();
        assert!(mock.get("https://x.test/anything").await.is_err());
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_call_count_filters_by_fragment() {
        let mock = MockFetch::new().with_response("", 200, "");
        mock.get("https://x.test/a").await.unwrap();
        mock.get("https://x.test/a").await.unwrap();
        mock.get("https://x.test/b").await.unwrap();
        assert_eq!(mock.call_count("/a"), 2);
        assert_eq!(mock.call_count("/b"), 1);
    }
}
