//! Aggregation pipeline: fan out, join, never lose a source.
//!
//! Detail fetches within one source run concurrently and are joined —
//! a slow note delays its source's result but never corrupts or reorders
//! it. Sources are independent units of work: one source failing never
//! prevents the others from succeeding.

use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, warn};

use casenote_core::{AggregateResponse, CaseNoteCollection, Keyword, NoteTypeOption};

use crate::source::CaseNoteClient;

impl CaseNoteClient {
    /// Aggregate one source: fetch its summaries, then enrich every
    /// summary concurrently.
    ///
    /// A summary-fetch failure yields a collection carrying the source
    /// error and an empty note list — no enrichment is attempted. The
    /// note sequence always preserves summary order regardless of
    /// completion order.
    pub async fn aggregate(&self, ehr_id: &str) -> CaseNoteCollection {
        let start = Instant::now();
        let summaries = match self.fetch_summaries(ehr_id).await {
            Ok(summaries) => summaries,
            Err(error) => {
                warn!(ehr_id, error = %error, "aggregation failed at summary fetch");
                return CaseNoteCollection::failed(ehr_id, error);
            }
        };

        // join_all keeps input order; per-note failures are captured
        // inside each EnrichedNote by fetch_detail.
        let notes = join_all(
            summaries
                .into_iter()
                .map(|summary| self.fetch_detail(ehr_id, summary)),
        )
        .await;

        let failed = notes.iter().filter(|n| n.error.is_some()).count();
        debug!(
            ehr_id,
            note_count = notes.len(),
            failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "aggregated source"
        );
        CaseNoteCollection::ok(ehr_id, notes)
    }

    /// Aggregate every given source concurrently. Results come back in
    /// input order, one collection per source, failures included as data.
    pub async fn aggregate_all(&self, ehr_ids: &[String]) -> Vec<CaseNoteCollection> {
        join_all(ehr_ids.iter().map(|ehr_id| self.aggregate(ehr_id))).await
    }

    /// Aggregate one source with its best-effort side data fetched
    /// alongside.
    pub async fn aggregate_with_side_data(
        &self,
        ehr_id: &str,
    ) -> (CaseNoteCollection, Vec<Keyword>, Vec<NoteTypeOption>) {
        futures::join!(
            self.aggregate(ehr_id),
            self.fetch_keywords(ehr_id),
            self.fetch_note_types(ehr_id)
        )
    }

    /// The full aggregate read operation over the configured sources.
    pub async fn aggregate_response(&self) -> AggregateResponse {
        let ehr_ids = self.config().ehr_ids.clone();
        let start = Instant::now();
        let results = join_all(
            ehr_ids
                .iter()
                .map(|ehr_id| self.aggregate_with_side_data(ehr_id)),
        )
        .await;

        let mut response = AggregateResponse::default();
        for (collection, keywords, note_types) in results {
            response.collections.push(collection);
            response.keywords.extend(keywords);
            response.note_types.extend(note_types);
        }
        info!(
            sources = response.collections.len(),
            note_count = response
                .collections
                .iter()
                .map(|c| c.notes.len())
                .sum::<usize>(),
            duration_ms = start.elapsed().as_millis() as u64,
            "aggregate read complete"
        );
        response
    }
}
