//! Data model for case-note aggregation.
//!
//! Wire-facing types keep the record-keeping service's field names
//! (`CompositionId`, `Dokument_ID`, `Vårdenhet_Namn`, …) through serde
//! renames, so a fetched summary deserializes without a mapping layer and
//! re-serializes byte-compatibly for downstream consumers.

use serde::{Deserialize, Serialize};

use crate::error::{NoteError, SourceError};

// =============================================================================
// NOTE SUMMARY
// =============================================================================

/// One case-note summary as returned by the source's list view.
///
/// Immutable once fetched. `date_time` is the source of truth for
/// chronological ordering; `display_date_time` is the upstream-formatted
/// presentation string and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteSummary {
    /// Identifier of this note within its source. May be absent upstream;
    /// enrichment of such a note fails without a network call.
    #[serde(rename = "CompositionId", default, skip_serializing_if = "Option::is_none")]
    pub composition_id: Option<String>,

    /// ISO-8601 timestamp of the note.
    #[serde(rename = "DateTime")]
    pub date_time: String,

    /// Upstream-formatted timestamp for display.
    #[serde(rename = "DisplayDateTime", default)]
    pub display_date_time: String,

    /// Document identifier.
    #[serde(rename = "Dokument_ID", default)]
    pub document_id: String,

    /// Author role identifier.
    #[serde(rename = "Dokument_skapad_av_yrkestitel_ID", default)]
    pub author_role_id: String,

    /// Author role name (e.g. "Läkare").
    #[serde(rename = "Dokument_skapad_av_yrkestitel_Namn", default)]
    pub author_role_name: String,

    /// Document-type code (e.g. "BES").
    #[serde(rename = "Dokumentationskod", default)]
    pub doc_type_code: String,

    /// Document-type name (e.g. "Läkaranteckning").
    #[serde(rename = "Dokumentnamn", default)]
    pub document_name: String,

    /// Timestamp the document was saved upstream.
    #[serde(rename = "Tidsstämpel_för_sparat_dokument", default)]
    pub saved_at: String,

    /// Organizational-unit identifier.
    #[serde(rename = "Vårdenhet_Identifierare", default)]
    pub unit_id: String,

    /// Organizational-unit name (e.g. "Karolinska ÖV").
    #[serde(rename = "Vårdenhet_Namn", default)]
    pub unit_name: String,
}

// =============================================================================
// ENRICHED NOTE
// =============================================================================

/// Detail content of a note, fetched separately from its summary.
///
/// `NotFound` is the structured stand-in for a successful detail response
/// that carried no extractable content; it keeps downstream rendering
/// uniform without smuggling markup into the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "markup", rename_all = "snake_case")]
pub enum CaseBody {
    /// Body content as delivered by the detail view (inline markup).
    Markup(String),
    /// The detail view answered successfully but held no case data.
    NotFound,
}

impl CaseBody {
    /// The markup content, when present.
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Markup(m) => Some(m),
            Self::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// A note summary plus the outcome of its detail enrichment.
///
/// Produced once by the aggregation pipeline and never mutated afterwards;
/// downstream stages only read it. For a note that went through enrichment,
/// exactly one of `case_data`/`error` is normally populated. Both absent
/// means enrichment was never attempted (source-level failure upstream);
/// both present means enrichment partially succeeded and the pipeline chose
/// to annotate rather than drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedNote {
    #[serde(flatten)]
    pub summary: NoteSummary,

    /// Detail content, or the not-found sentinel.
    #[serde(rename = "CaseData", default, skip_serializing_if = "Option::is_none")]
    pub case_data: Option<CaseBody>,

    /// Failure attached to this specific note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NoteError>,
}

impl EnrichedNote {
    /// Wrap a summary whose enrichment was never attempted.
    pub fn unenriched(summary: NoteSummary) -> Self {
        Self {
            summary,
            case_data: None,
            error: None,
        }
    }

    /// Enrichment succeeded with the given body.
    pub fn with_case_data(summary: NoteSummary, body: CaseBody) -> Self {
        Self {
            summary,
            case_data: Some(body),
            error: None,
        }
    }

    /// Enrichment failed; the failure is captured as data.
    pub fn with_error(summary: NoteSummary, error: NoteError) -> Self {
        Self {
            summary,
            case_data: None,
            error: Some(error),
        }
    }

    /// Stable identifier for idempotent re-rendering across rebuilds.
    ///
    /// Derived from the note's own document identifier, falling back to the
    /// composition id and finally the raw timestamp for degenerate upstream
    /// records.
    pub fn display_key(&self) -> &str {
        if !self.summary.document_id.is_empty() {
            &self.summary.document_id
        } else if let Some(id) = self.summary.composition_id.as_deref() {
            id
        } else {
            &self.summary.date_time
        }
    }
}

// =============================================================================
// AGGREGATION RESULT
// =============================================================================

/// The aggregation outcome for one source: its enriched notes in source
/// order, or a source-level error with an empty note list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNoteCollection {
    /// The source (EHR) identifier this collection belongs to.
    pub ehr_id: String,

    /// Enriched notes in the order the source listed them. Enrichment
    /// concurrency never reorders this sequence.
    pub notes: Vec<EnrichedNote>,

    /// Set when the summary fetch itself failed; `notes` is empty then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SourceError>,
}

impl CaseNoteCollection {
    /// A successfully aggregated collection.
    pub fn ok(ehr_id: impl Into<String>, notes: Vec<EnrichedNote>) -> Self {
        Self {
            ehr_id: ehr_id.into(),
            notes,
            error: None,
        }
    }

    /// A collection whose summary fetch failed.
    pub fn failed(ehr_id: impl Into<String>, error: SourceError) -> Self {
        Self {
            ehr_id: ehr_id.into(),
            notes: Vec::new(),
            error: Some(error),
        }
    }
}

// =============================================================================
// AUXILIARY FEEDS
// =============================================================================

/// One entry of the side-channel keyword feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// The note this keyword belongs to.
    #[serde(rename = "CompositionId", default)]
    pub composition_id: String,
}

/// One entry of the note-type filter-option feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTypeOption {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Payload of the aggregate read operation: one collection per configured
/// source plus best-effort auxiliary feeds.
///
/// `error` is set only when the overall call failed before any source could
/// be processed; the collections are empty then, never uninitialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub collections: Vec<CaseNoteCollection>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub note_types: Vec<NoteTypeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
