//! Client configuration.
//!
//! The base endpoint, credentials, and source identifiers are injected —
//! nothing in the fetch pipeline hard-codes where the record-keeping
//! service lives or how to authenticate against it.

use casenote_core::{Error, Result};

/// Default view name for the case-note list of a source.
pub const DEFAULT_LIST_VIEW: &str = "RSK.View.CaseNoteList";

/// Default view name for the detail content of one note.
pub const DEFAULT_DETAIL_VIEW: &str = "RSK.View.CaseNote";

/// Default view name for the side-channel keyword feed.
pub const DEFAULT_KEYWORD_VIEW: &str = "RSK.View.KeywordList";

/// Default view name for the side-channel note-type filter feed.
pub const DEFAULT_NOTE_TYPE_VIEW: &str = "RSK.View.NoteTypeList";

/// Default bounded timeout for every remote call (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`CaseNoteClient`](crate::CaseNoteClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the record-keeping service's view API.
    pub base_url: String,
    /// HTTP Basic username.
    pub username: String,
    /// HTTP Basic password.
    pub password: String,
    /// The sources to aggregate over.
    pub ehr_ids: Vec<String>,
    /// View names, overridable per deployment.
    pub list_view: String,
    pub detail_view: String,
    pub keyword_view: String,
    pub note_type_view: String,
    /// Bounded per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Build a config with default view names and timeout.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        ehr_ids: Vec<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            ehr_ids,
            list_view: DEFAULT_LIST_VIEW.to_string(),
            detail_view: DEFAULT_DETAIL_VIEW.to_string(),
            keyword_view: DEFAULT_KEYWORD_VIEW.to_string(),
            note_type_view: DEFAULT_NOTE_TYPE_VIEW.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Meaning | Default |
    /// |---|---|---|
    /// | `CASENOTE_BASE_URL` | view API base URL | required |
    /// | `CASENOTE_USERNAME` | Basic auth user | required |
    /// | `CASENOTE_PASSWORD` | Basic auth password | required |
    /// | `CASENOTE_EHR_IDS` | comma-separated source ids | required |
    /// | `CASENOTE_TIMEOUT_SECS` | per-request timeout | 30 |
    pub fn from_env() -> Result<Self> {
        let base_url = require_env("CASENOTE_BASE_URL")?;
        let username = require_env("CASENOTE_USERNAME")?;
        let password = require_env("CASENOTE_PASSWORD")?;
        let ehr_ids: Vec<String> = require_env("CASENOTE_EHR_IDS")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if ehr_ids.is_empty() {
            return Err(Error::Config(
                "CASENOTE_EHR_IDS must name at least one source".to_string(),
            ));
        }

        let mut config = Self::new(base_url, username, password, ehr_ids);
        if let Ok(raw) = std::env::var("CASENOTE_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid CASENOTE_TIMEOUT_SECS: {}", raw)))?;
        }
        Ok(config)
    }

    /// URL of the summary list view for one source.
    pub fn list_url(&self, ehr_id: &str) -> String {
        format!("{}/{}/{}", self.base(), ehr_id, self.list_view)
    }

    /// URL of the detail view for one note of one source.
    pub fn detail_url(&self, ehr_id: &str, composition_id: &str) -> String {
        format!(
            "{}/{}/{}?compId={}",
            self.base(),
            ehr_id,
            self.detail_view,
            composition_id
        )
    }

    /// URL of the keyword feed for one source.
    pub fn keyword_url(&self, ehr_id: &str) -> String {
        format!("{}/{}/{}", self.base(), ehr_id, self.keyword_view)
    }

    /// URL of the note-type filter feed for one source.
    pub fn note_type_url(&self, ehr_id: &str) -> String {
        format!("{}/{}/{}", self.base(), ehr_id, self.note_type_view)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(
            "https://ehr.example.test/rest/v1/view/",
            "user",
            "secret",
            vec!["ehr-1".to_string()],
        )
    }

    #[test]
    fn test_list_url_joins_base_source_and_view() {
        assert_eq!(
            config().list_url("ehr-1"),
            "https://ehr.example.test/rest/v1/view/ehr-1/RSK.View.CaseNoteList"
        );
    }

    #[test]
    fn test_detail_url_carries_composition_id() {
        assert_eq!(
            config().detail_url("ehr-1", "comp-42"),
            "https://ehr.example.test/rest/v1/view/ehr-1/RSK.View.CaseNote?compId=comp-42"
        );
    }

    #[test]
    fn test_defaults() {
        let c = config();
        assert_eq!(c.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(c.keyword_view, DEFAULT_KEYWORD_VIEW);
        assert_eq!(c.note_type_view, DEFAULT_NOTE_TYPE_VIEW);
    }
}
