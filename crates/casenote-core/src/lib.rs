//! # casenote-core
//!
//! Core types and the timeline engine for the casenote aggregator.
//!
//! This crate holds everything that needs no I/O: the data model for
//! summaries, enriched notes and per-source results; the error taxonomy;
//! the Year→Month(→Day) hierarchy builder with its visibility counter and
//! flattener; the keyword vocabulary and selection filter; and the session
//! state surface consumed by a presentation layer.

pub mod error;
pub mod flatten;
pub mod keywords;
pub mod logging;
pub mod models;
pub mod state;
pub mod timeline;

// Re-export commonly used types at crate root
pub use error::{Error, NoteError, Result, SourceError, SourceErrorKind};
pub use flatten::{flatten, DisplayItem};
pub use keywords::{
    extract_emphasized, feed_vocabulary, filter_by_selection, note_keywords, swedish_cmp,
    SelectedKeywords,
};
pub use models::{
    AggregateResponse, CaseBody, CaseNoteCollection, EnrichedNote, Keyword, NoteSummary,
    NoteTypeOption,
};
pub use state::NoteSession;
pub use timeline::{
    count_visible, GroupingDepth, Hierarchy, HierarchyConfig, NodeContent, NodeKind, NodePath,
    TimeNode,
};
