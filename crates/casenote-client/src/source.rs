//! Record source adapter: summary lists and side-channel feeds.

use std::sync::Arc;

use tracing::{debug, warn};

use casenote_core::{Keyword, NoteSummary, NoteTypeOption, SourceError};

use crate::config::ClientConfig;
use crate::fetch::{HttpFetcher, RecordFetch};

/// Client for the record-keeping service's view API.
///
/// Holds the fetch capability and the injected configuration; all
/// aggregation entry points live on this type.
#[derive(Clone)]
pub struct CaseNoteClient {
    fetch: Arc<dyn RecordFetch>,
    config: ClientConfig,
}

impl CaseNoteClient {
    /// Build with the reqwest-backed fetcher.
    pub fn new(config: ClientConfig) -> casenote_core::Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Build with an injected fetch capability (tests, alternative
    /// transports).
    pub fn with_fetcher(config: ClientConfig, fetch: Arc<dyn RecordFetch>) -> Self {
        Self { fetch, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn fetcher(&self) -> &Arc<dyn RecordFetch> {
        &self.fetch
    }

    /// Fetch the note summaries of one source. All-or-nothing: a
    /// non-success status, transport failure, or malformed body yields a
    /// [`SourceError`] and no partial data. Never retried.
    pub async fn fetch_summaries(
        &self,
        ehr_id: &str,
    ) -> std::result::Result<Vec<NoteSummary>, SourceError> {
        let url = self.config.list_url(ehr_id);
        let response = match self.fetch.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(ehr_id, error = %e, "summary fetch failed at transport level");
                return Err(SourceError::from(&e));
            }
        };

        if !response.is_success() {
            warn!(ehr_id, status = response.status, "summary fetch returned non-success");
            return Err(SourceError::from_status(response.status));
        }

        let summaries: Vec<NoteSummary> = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::parse(e.to_string()))?;
        debug!(ehr_id, note_count = summaries.len(), "fetched summaries");
        Ok(summaries)
    }

    /// Fetch the side-channel keyword feed for one source. Best-effort:
    /// any failure degrades to an empty list and is only logged.
    pub async fn fetch_keywords(&self, ehr_id: &str) -> Vec<Keyword> {
        self.fetch_feed(ehr_id, &self.config.keyword_url(ehr_id), "keyword feed")
            .await
    }

    /// Fetch the side-channel note-type filter feed for one source.
    /// Best-effort, like the keyword feed.
    pub async fn fetch_note_types(&self, ehr_id: &str) -> Vec<NoteTypeOption> {
        self.fetch_feed(ehr_id, &self.config.note_type_url(ehr_id), "note-type feed")
            .await
    }

    async fn fetch_feed<T: serde::de::DeserializeOwned>(
        &self,
        ehr_id: &str,
        url: &str,
        feed: &str,
    ) -> Vec<T> {
        let response = match self.fetch.get(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(ehr_id, feed, error = %e, "auxiliary feed unavailable");
                return Vec::new();
            }
        };
        if !response.is_success() {
            warn!(ehr_id, feed, status = response.status, "auxiliary feed returned non-success");
            return Vec::new();
        }
        match serde_json::from_str(&response.body) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(ehr_id, feed, error = %e, "auxiliary feed body unparseable");
                Vec::new()
            }
        }
    }
}
