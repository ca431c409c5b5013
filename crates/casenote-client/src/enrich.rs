//! Detail enricher: turns one note summary into an enriched note.

use serde::Deserialize;
use tracing::{trace, warn};

use casenote_core::{CaseBody, EnrichedNote, NoteError, NoteSummary};

use crate::source::CaseNoteClient;

/// Shape of one entry of the detail view's response array.
#[derive(Debug, Deserialize)]
struct CaseNoteDetail {
    #[serde(rename = "CaseData", default)]
    case_data: Option<String>,
}

impl CaseNoteClient {
    /// Fetch the detail content for one summary.
    ///
    /// Every outcome is an [`EnrichedNote`] — this call never fails past
    /// its own boundary:
    ///
    /// - no composition id → missing-identifier error, no network call
    /// - non-success status → error embedding the id and status
    /// - success without extractable case data → [`CaseBody::NotFound`]
    ///   sentinel, no error
    /// - transport failure → treated like the non-success case
    pub async fn fetch_detail(&self, ehr_id: &str, summary: NoteSummary) -> EnrichedNote {
        let Some(composition_id) = summary.composition_id.clone() else {
            trace!(ehr_id, "summary has no composition id, skipping detail fetch");
            return EnrichedNote::with_error(summary, NoteError::missing_id());
        };

        let url = self.config().detail_url(ehr_id, &composition_id);
        let response = match self.fetcher().get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(ehr_id, %composition_id, error = %e, "detail fetch failed");
                return EnrichedNote::with_error(
                    summary,
                    NoteError::transport(&composition_id, e.to_string()),
                );
            }
        };

        if !response.is_success() {
            warn!(
                ehr_id,
                %composition_id,
                status = response.status,
                "detail fetch returned non-success"
            );
            return EnrichedNote::with_error(
                summary,
                NoteError::detail_status(&composition_id, response.status),
            );
        }

        match serde_json::from_str::<Vec<CaseNoteDetail>>(&response.body) {
            Ok(details) => match details.into_iter().next().and_then(|d| d.case_data) {
                Some(markup) => {
                    trace!(ehr_id, %composition_id, "detail fetched");
                    EnrichedNote::with_case_data(summary, CaseBody::Markup(markup))
                }
                None => {
                    trace!(ehr_id, %composition_id, "detail response held no case data");
                    EnrichedNote::with_case_data(summary, CaseBody::NotFound)
                }
            },
            Err(e) => EnrichedNote::with_error(
                summary,
                NoteError::transport(&composition_id, format!("invalid detail body: {}", e)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::mock::MockFetch;
    use std::sync::Arc;

    fn client(mock: &MockFetch) -> CaseNoteClient {
        let config = ClientConfig::new(
            "https://ehr.example.test/view",
            "user",
            "secret",
            vec!["ehr-1".to_string()],
        );
        CaseNoteClient::with_fetcher(config, Arc::new(mock.clone()))
    }

    fn summary(composition_id: Option<&str>) -> NoteSummary {
        NoteSummary {
            composition_id: composition_id.map(String::from),
            date_time: "2023-01-01T10:00:00Z".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_id_short_circuits_without_network_call() {
        let mock = MockFetch::new();
        let note = client(&mock).fetch_detail("ehr-1", summary(None)).await;

        assert!(note.case_data.is_none());
        let error = note.error.expect("missing id must yield an error");
        assert_eq!(error.composition_id, None);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_success_with_case_data() {
        let mock = MockFetch::new().with_response(
            "compId=c-1",
            200,
            r#"[{"CaseData": "<div><b>Anamnes</b> text</div>"}]"#,
        );
        let note = client(&mock).fetch_detail("ehr-1", summary(Some("c-1"))).await;

        assert_eq!(
            note.case_data,
            Some(CaseBody::Markup("<div><b>Anamnes</b> text</div>".into()))
        );
        assert!(note.error.is_none());
    }

    #[tokio::test]
    async fn test_success_without_case_data_yields_not_found_sentinel() {
        let mock = MockFetch::new().with_response("compId=c-1", 200, "[]");
        let note = client(&mock).fetch_detail("ehr-1", summary(Some("c-1"))).await;

        assert_eq!(note.case_data, Some(CaseBody::NotFound));
        assert!(note.error.is_none());
    }

    #[tokio::test]
    async fn test_success_with_null_case_data_yields_not_found_sentinel() {
        let mock = MockFetch::new().with_response("compId=c-1", 200, r#"[{"CaseData": null}]"#);
        let note = client(&mock).fetch_detail("ehr-1", summary(Some("c-1"))).await;

        assert_eq!(note.case_data, Some(CaseBody::NotFound));
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_note_error() {
        let mock = MockFetch::new().with_response("compId=c-1", 500, "");
        let note = client(&mock).fetch_detail("ehr-1", summary(Some("c-1"))).await;

        assert!(note.case_data.is_none());
        let error = note.error.expect("500 must yield an error");
        assert_eq!(error.composition_id.as_deref(), Some("c-1"));
        assert!(error.cause.contains("500"));
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_note_error() {
        let mock = MockFetch::new().with_transport_error("compId=c-1", "connection reset");
        let note = client(&mock).fetch_detail("ehr-1", summary(Some("c-1"))).await;

        assert!(note.case_data.is_none());
        let error = note.error.expect("transport failure must yield an error");
        assert!(error.cause.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_summary_survives_enrichment_untouched() {
        let mock = MockFetch::new().with_response("compId=c-1", 200, "[]");
        let input = NoteSummary {
            composition_id: Some("c-1".into()),
            date_time: "2023-01-01T10:00:00Z".into(),
            document_name: "Läkaranteckning".into(),
            unit_name: "Karolinska ÖV".into(),
            ..Default::default()
        };
        let note = client(&mock).fetch_detail("ehr-1", input.clone()).await;
        assert_eq!(note.summary, input);
    }
}
