//! Session state surface for the presentation layer.
//!
//! [`NoteSession`] owns everything a presentation layer reads — the
//! enriched collections, the derived keyword vocabulary, the selection, and
//! the built hierarchy with live collapse state — and exposes explicit
//! update operations instead of ambient mutable stores. All mutation goes
//! through `load`/`toggle`/`select_keyword` and friends; nothing here is
//! shared or locked, the owner drives it single-threaded.

use tracing::debug;

use crate::flatten::{flatten, DisplayItem};
use crate::keywords::{extract_emphasized, feed_vocabulary, filter_by_selection, SelectedKeywords};
use crate::models::{CaseBody, CaseNoteCollection, EnrichedNote, Keyword, NoteTypeOption};
use crate::timeline::{Hierarchy, HierarchyConfig, NodePath};

/// In-memory state for one aggregation session.
///
/// Lives for the current session only; nothing is persisted. Reloading
/// replaces the data wholesale, and every operation that changes the
/// effective note set rebuilds the hierarchy — which resets collapse state
/// by design.
#[derive(Debug, Clone)]
pub struct NoteSession {
    collections: Vec<CaseNoteCollection>,
    keyword_feed: Vec<Keyword>,
    note_types: Vec<NoteTypeOption>,
    vocabulary: Vec<String>,
    selected: SelectedKeywords,
    hierarchy: Hierarchy,
    config: HierarchyConfig,
}

impl NoteSession {
    /// An empty session with the given hierarchy configuration.
    pub fn new(config: HierarchyConfig) -> Self {
        Self {
            collections: Vec::new(),
            keyword_feed: Vec::new(),
            note_types: Vec::new(),
            vocabulary: Vec::new(),
            selected: SelectedKeywords::new(),
            hierarchy: Hierarchy::empty(config),
            config,
        }
    }

    /// Replace the session contents with a fresh aggregation result.
    ///
    /// Derives the vocabulary (from the keyword feed when present,
    /// otherwise from emphasized spans across the notes' case data),
    /// clears the selection, and rebuilds the hierarchy.
    pub fn load(
        &mut self,
        collections: Vec<CaseNoteCollection>,
        keyword_feed: Vec<Keyword>,
        note_types: Vec<NoteTypeOption>,
    ) {
        self.collections = collections;
        self.keyword_feed = keyword_feed;
        self.note_types = note_types;
        self.vocabulary = if self.keyword_feed.is_empty() {
            let merged: String = self
                .all_notes()
                .into_iter()
                .filter_map(|n| n.case_data.as_ref().and_then(CaseBody::markup))
                .collect::<Vec<_>>()
                .join("\n");
            extract_emphasized(&merged)
        } else {
            feed_vocabulary(&self.keyword_feed)
        };
        self.selected.clear();
        self.rebuild();
        debug!(
            collections = self.collections.len(),
            notes = self.all_notes().len(),
            vocabulary = self.vocabulary.len(),
            "session loaded"
        );
    }

    /// Reset to the well-defined empty state (used when the aggregate call
    /// fails outright — the caller's state is never left uninitialized).
    pub fn clear(&mut self) {
        self.collections.clear();
        self.keyword_feed.clear();
        self.note_types.clear();
        self.vocabulary.clear();
        self.selected.clear();
        self.hierarchy = Hierarchy::empty(self.config);
    }

    pub fn collections(&self) -> &[CaseNoteCollection] {
        &self.collections
    }

    pub fn note_types(&self) -> &[NoteTypeOption] {
        &self.note_types
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn selected(&self) -> &SelectedKeywords {
        &self.selected
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Every enriched note across all collections, in source order.
    pub fn all_notes(&self) -> Vec<&EnrichedNote> {
        self.collections.iter().flat_map(|c| c.notes.iter()).collect()
    }

    /// Add a keyword to the selection and rebuild. Selecting a keyword no
    /// note references is allowed — the hierarchy simply comes back empty.
    pub fn select_keyword(&mut self, keyword: impl Into<String>) {
        if self.selected.insert(keyword.into()) {
            self.rebuild();
        }
    }

    /// Remove a keyword from the selection and rebuild.
    pub fn deselect_keyword(&mut self, keyword: &str) {
        if self.selected.remove(keyword) {
            self.rebuild();
        }
    }

    /// Drop the whole selection and rebuild.
    pub fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.rebuild();
        }
    }

    /// Flip the collapse state of one hierarchy node.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        self.hierarchy.toggle(path)
    }

    /// Number of items the current tree presents, honoring collapse state.
    pub fn visible_count(&self) -> usize {
        self.hierarchy.visible_count()
    }

    /// The ordered display feed for the current tree state.
    pub fn display_feed(&self) -> Vec<DisplayItem> {
        flatten(&self.hierarchy)
    }

    /// Re-derive the hierarchy from the currently filtered note set.
    /// Collapse state does not survive this — a rebuilt tree starts from
    /// the configured default.
    fn rebuild(&mut self) {
        let all: Vec<EnrichedNote> = self
            .collections
            .iter()
            .flat_map(|c| c.notes.iter().cloned())
            .collect();
        let filtered: Vec<EnrichedNote> =
            filter_by_selection(&all, &self.selected, &self.keyword_feed)
                .into_iter()
                .cloned()
                .collect();
        self.hierarchy = Hierarchy::build(&filtered, self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteSummary;
    use crate::timeline::GroupingDepth;

    fn note(id: &str, date_time: &str, markup: &str) -> EnrichedNote {
        EnrichedNote::with_case_data(
            NoteSummary {
                composition_id: Some(id.to_string()),
                date_time: date_time.to_string(),
                document_id: format!("DOC-{}", id),
                ..Default::default()
            },
            CaseBody::Markup(markup.to_string()),
        )
    }

    fn expanded_config() -> HierarchyConfig {
        HierarchyConfig {
            depth: GroupingDepth::Month,
            start_collapsed: false,
        }
    }

    fn loaded_session() -> NoteSession {
        let mut session = NoteSession::new(expanded_config());
        session.load(
            vec![CaseNoteCollection::ok(
                "ehr-1",
                vec![
                    note("c1", "2023-01-01T10:00:00Z", "<b>Anamnes</b>"),
                    note("c2", "2023-02-14T09:00:00Z", "<b>Status</b>"),
                ],
            )],
            vec![],
            vec![],
        );
        session
    }

    #[test]
    fn test_load_builds_hierarchy_and_vocabulary() {
        let session = loaded_session();
        assert_eq!(session.visible_count(), 2);
        assert_eq!(session.vocabulary(), ["Anamnes", "Status"]);
    }

    #[test]
    fn test_vocabulary_prefers_feed_when_present() {
        let mut session = NoteSession::new(expanded_config());
        session.load(
            vec![CaseNoteCollection::ok(
                "ehr-1",
                vec![note("c1", "2023-01-01T10:00:00Z", "<b>Anamnes</b>")],
            )],
            vec![Keyword {
                id: "k1".into(),
                name: "Diagnos".into(),
                composition_id: "c1".into(),
            }],
            vec![],
        );
        assert_eq!(session.vocabulary(), ["Diagnos"]);
    }

    #[test]
    fn test_select_keyword_filters_hierarchy() {
        let mut session = loaded_session();
        session.select_keyword("Anamnes");
        assert_eq!(session.visible_count(), 1);
        let feed = session.display_feed();
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_select_unreferenced_keyword_empties_hierarchy() {
        let mut session = loaded_session();
        session.select_keyword("Diagnos");
        assert!(session.hierarchy().is_empty());
        assert_eq!(session.visible_count(), 0);
    }

    #[test]
    fn test_clear_selection_restores_full_set() {
        let mut session = loaded_session();
        session.select_keyword("Anamnes");
        session.clear_selection();
        assert_eq!(session.visible_count(), 2);
        assert!(session.selected().is_empty());
    }

    #[test]
    fn test_selection_rebuild_resets_collapse_state() {
        let mut session = loaded_session();
        let path = NodePath::year(2023);
        assert!(session.toggle(&path));
        assert_eq!(session.visible_count(), 1);

        // Selecting then deselecting rebuilds; the collapse is gone.
        session.select_keyword("Status");
        session.clear_selection();
        assert_eq!(session.visible_count(), 2);
    }

    #[test]
    fn test_clear_resets_to_empty_state() {
        let mut session = loaded_session();
        session.clear();
        assert!(session.collections().is_empty());
        assert!(session.vocabulary().is_empty());
        assert!(session.hierarchy().is_empty());
        assert_eq!(session.visible_count(), 0);
    }

    #[test]
    fn test_all_notes_spans_collections_in_source_order() {
        let mut session = NoteSession::new(expanded_config());
        session.load(
            vec![
                CaseNoteCollection::ok("ehr-1", vec![note("a", "2023-01-01T10:00:00Z", "")]),
                CaseNoteCollection::ok("ehr-2", vec![note("b", "2022-01-01T10:00:00Z", "")]),
            ],
            vec![],
            vec![],
        );
        let ids: Vec<&str> = session
            .all_notes()
            .iter()
            .map(|n| n.summary.composition_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
