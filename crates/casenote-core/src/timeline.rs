//! Hierarchical timeline engine.
//!
//! Groups a flat collection of enriched notes into a collapsible
//! Year→Month(→Day) tree. Nodes carry an explicit discriminant
//! ([`NodeKind`]) and explicit content ([`NodeContent`]), so the visibility
//! counter and the flattener pattern-match exhaustively instead of probing
//! for fields at runtime.
//!
//! Invariants upheld by [`Hierarchy::build`]:
//!
//! - child keys are unique within one parent
//! - children are sorted descending by key (most recent first), and notes
//!   within the deepest level descending by timestamp — re-applied on every
//!   rebuild, never assumed stable from insertion order
//! - a rebuild resets every collapse flag to the configured default

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::EnrichedNote;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// How deep the grouping goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingDepth {
    /// Two levels: Year→Month, notes live in the month nodes.
    #[default]
    Month,
    /// Three levels: Year→Month→Day, notes live in the day nodes.
    /// The day key is the day of month (1–31).
    Day,
}

/// Tunables for hierarchy construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub depth: GroupingDepth,
    /// Collapse state given to every newly created node. Defaults to
    /// `true`: the timeline opens summarized.
    pub start_collapsed: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            depth: GroupingDepth::Month,
            start_collapsed: true,
        }
    }
}

// =============================================================================
// TREE NODES
// =============================================================================

/// Discriminant of a tree node: which calendar level it represents, and its
/// numeric key at that level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Calendar year.
    Year(i32),
    /// Month index within the year, 0–11.
    Month(u32),
    /// Day of month, 1–31.
    Day(u32),
}

/// What a node holds: child nodes, or the notes themselves at the deepest
/// configured level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeContent {
    Groups(Vec<TimeNode>),
    Notes(Vec<EnrichedNote>),
}

/// One node of the timeline tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeNode {
    pub kind: NodeKind,
    /// User-driven collapse state. Mutated only through
    /// [`Hierarchy::toggle`]/[`Hierarchy::set_collapsed`]; independent of
    /// siblings; reset by every rebuild.
    pub collapsed: bool,
    pub content: NodeContent,
}

impl TimeNode {
    /// Total number of leaf notes under this node, regardless of collapse
    /// state.
    pub fn note_count(&self) -> usize {
        match &self.content {
            NodeContent::Notes(notes) => notes.len(),
            NodeContent::Groups(children) => children.iter().map(TimeNode::note_count).sum(),
        }
    }
}

/// Address of a node within a hierarchy, used for toggle operations and as
/// the back-reference carried by collapsed summary items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePath {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl NodePath {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: None,
        }
    }

    pub fn day(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }
}

// =============================================================================
// VISIBILITY COUNTER
// =============================================================================

/// How many items the given nodes currently present: a collapsed node
/// stands in for its whole subtree as a single unit; an expanded node
/// contributes its notes, or the recursive sum over its children.
///
/// Pure — re-derive after every collapse mutation, never cache across them.
pub fn count_visible(nodes: &[TimeNode]) -> usize {
    nodes
        .iter()
        .map(|node| match &node.content {
            NodeContent::Notes(notes) => {
                if node.collapsed {
                    1
                } else {
                    notes.len()
                }
            }
            NodeContent::Groups(children) => {
                if node.collapsed {
                    1
                } else {
                    count_visible(children)
                }
            }
        })
        .sum()
}

// =============================================================================
// HIERARCHY
// =============================================================================

/// A built timeline tree with live collapse state.
///
/// Owns its nodes; the only mutations it permits are collapse toggles.
/// Rebuild from scratch to reflect a different note set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    nodes: Vec<TimeNode>,
    config: HierarchyConfig,
}

impl Hierarchy {
    /// An empty hierarchy.
    pub fn empty(config: HierarchyConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
        }
    }

    /// Group `notes` into a Year→Month(→Day) tree.
    ///
    /// Notes whose timestamp cannot be parsed are skipped with a warning
    /// rather than grouped into an invented bucket. Sorting is descending
    /// at every level; ties between equal timestamps keep source order.
    pub fn build(notes: &[EnrichedNote], config: HierarchyConfig) -> Self {
        // year → month (0-11) → day (1-31) → notes with their parse key
        let mut grouped: BTreeMap<i32, BTreeMap<u32, BTreeMap<u32, Vec<(i64, &EnrichedNote)>>>> =
            BTreeMap::new();

        for note in notes {
            let Some(ts) = parse_timestamp(&note.summary.date_time) else {
                warn!(
                    date_time = %note.summary.date_time,
                    document_id = %note.summary.document_id,
                    "skipping note with unparseable timestamp"
                );
                continue;
            };
            grouped
                .entry(ts.year())
                .or_default()
                .entry(ts.month0())
                .or_default()
                .entry(ts.day())
                .or_default()
                .push((ts.timestamp_millis(), note));
        }

        let nodes = grouped
            .iter()
            .rev()
            .map(|(&year, months)| TimeNode {
                kind: NodeKind::Year(year),
                collapsed: config.start_collapsed,
                content: NodeContent::Groups(
                    months
                        .iter()
                        .rev()
                        .map(|(&month, days)| TimeNode {
                            kind: NodeKind::Month(month),
                            collapsed: config.start_collapsed,
                            content: match config.depth {
                                GroupingDepth::Month => {
                                    // Merge the day buckets; the sort below
                                    // restores descending timestamp order.
                                    NodeContent::Notes(sorted_notes(
                                        days.values().flatten().copied().collect(),
                                    ))
                                }
                                GroupingDepth::Day => NodeContent::Groups(
                                    days.iter()
                                        .rev()
                                        .map(|(&day, placed)| TimeNode {
                                            kind: NodeKind::Day(day),
                                            collapsed: config.start_collapsed,
                                            content: NodeContent::Notes(sorted_notes(
                                                placed.clone(),
                                            )),
                                        })
                                        .collect(),
                                ),
                            },
                        })
                        .collect(),
                ),
            })
            .collect();

        Self { nodes, config }
    }

    /// The year nodes, most recent first.
    pub fn nodes(&self) -> &[TimeNode] {
        &self.nodes
    }

    pub fn config(&self) -> HierarchyConfig {
        self.config
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of leaf notes in the tree.
    pub fn note_count(&self) -> usize {
        self.nodes.iter().map(TimeNode::note_count).sum()
    }

    /// Number of items currently presented, honoring collapse state.
    pub fn visible_count(&self) -> usize {
        count_visible(&self.nodes)
    }

    /// Flip the collapse flag of the addressed node. Returns `false` when
    /// the path does not name a node in this tree.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        match self.node_mut(path) {
            Some(node) => {
                node.collapsed = !node.collapsed;
                true
            }
            None => false,
        }
    }

    /// Set the collapse flag of the addressed node.
    pub fn set_collapsed(&mut self, path: &NodePath, collapsed: bool) -> bool {
        match self.node_mut(path) {
            Some(node) => {
                node.collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    /// Set the collapse flag of every node in the tree.
    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        fn apply(nodes: &mut [TimeNode], collapsed: bool) {
            for node in nodes {
                node.collapsed = collapsed;
                if let NodeContent::Groups(children) = &mut node.content {
                    apply(children, collapsed);
                }
            }
        }
        apply(&mut self.nodes, collapsed);
    }

    fn node_mut(&mut self, path: &NodePath) -> Option<&mut TimeNode> {
        let year = self
            .nodes
            .iter_mut()
            .find(|n| n.kind == NodeKind::Year(path.year))?;
        let Some(month) = path.month else {
            return Some(year);
        };
        let months = match &mut year.content {
            NodeContent::Groups(children) => children,
            NodeContent::Notes(_) => return None,
        };
        let month_node = months
            .iter_mut()
            .find(|n| n.kind == NodeKind::Month(month))?;
        let Some(day) = path.day else {
            return Some(month_node);
        };
        let days = match &mut month_node.content {
            NodeContent::Groups(children) => children,
            NodeContent::Notes(_) => return None,
        };
        days.iter_mut().find(|n| n.kind == NodeKind::Day(day))
    }
}

/// Sort placed notes descending by timestamp and drop the parse keys.
/// `sort_by` is stable, so equal timestamps keep their source order.
fn sorted_notes(mut placed: Vec<(i64, &EnrichedNote)>) -> Vec<EnrichedNote> {
    placed.sort_by(|a, b| b.0.cmp(&a.0));
    placed.into_iter().map(|(_, note)| note.clone()).collect()
}

/// Parse an ISO-8601 timestamp, accepting both offset-carrying RFC 3339
/// strings and the service's naive `YYYY-MM-DDTHH:MM:SS` form (read as
/// UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteSummary;

    fn note(id: &str, date_time: &str) -> EnrichedNote {
        EnrichedNote::unenriched(NoteSummary {
            composition_id: Some(id.to_string()),
            date_time: date_time.to_string(),
            document_id: format!("DOC-{}", id),
            ..Default::default()
        })
    }

    fn expanded_config() -> HierarchyConfig {
        HierarchyConfig {
            depth: GroupingDepth::Month,
            start_collapsed: false,
        }
    }

    #[test]
    fn test_build_groups_by_year_and_month() {
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2023-01-01T11:00:00Z"),
            note("c", "2023-02-14T09:00:00Z"),
        ];
        let hierarchy = Hierarchy::build(&notes, expanded_config());

        assert_eq!(hierarchy.nodes().len(), 1);
        let year = &hierarchy.nodes()[0];
        assert_eq!(year.kind, NodeKind::Year(2023));
        let NodeContent::Groups(months) = &year.content else {
            panic!("year node must hold groups");
        };
        assert_eq!(months.len(), 2);
        // Descending by month key: February (1) before January (0).
        assert_eq!(months[0].kind, NodeKind::Month(1));
        assert_eq!(months[1].kind, NodeKind::Month(0));
    }

    #[test]
    fn test_build_sorts_everything_descending() {
        let notes = vec![
            note("old", "2021-05-01T08:00:00Z"),
            note("newest", "2023-12-24T10:00:00Z"),
            note("mid", "2022-03-05T12:00:00Z"),
            note("late-2023", "2023-01-02T00:00:00Z"),
        ];
        let hierarchy = Hierarchy::build(&notes, expanded_config());

        let years: Vec<NodeKind> = hierarchy.nodes().iter().map(|n| n.kind).collect();
        assert_eq!(
            years,
            vec![
                NodeKind::Year(2023),
                NodeKind::Year(2022),
                NodeKind::Year(2021)
            ]
        );
    }

    #[test]
    fn test_notes_within_month_sorted_by_timestamp_descending() {
        let notes = vec![
            note("am", "2024-02-10T08:30:00Z"),
            note("pm", "2024-02-10T16:45:00Z"),
            note("noon", "2024-02-11T12:00:00Z"),
        ];
        let hierarchy = Hierarchy::build(&notes, expanded_config());
        let NodeContent::Groups(months) = &hierarchy.nodes()[0].content else {
            panic!("year node must hold groups");
        };
        let NodeContent::Notes(in_month) = &months[0].content else {
            panic!("month node must hold notes at Month depth");
        };
        let ids: Vec<&str> = in_month
            .iter()
            .map(|n| n.summary.composition_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["noon", "pm", "am"]);
    }

    #[test]
    fn test_day_depth_groups_by_day_of_month() {
        let notes = vec![
            note("a", "2024-02-10T08:30:00Z"),
            note("b", "2024-02-10T16:45:00Z"),
            note("c", "2024-02-11T12:00:00Z"),
        ];
        let config = HierarchyConfig {
            depth: GroupingDepth::Day,
            start_collapsed: false,
        };
        let hierarchy = Hierarchy::build(&notes, config);
        let NodeContent::Groups(months) = &hierarchy.nodes()[0].content else {
            panic!("year node must hold groups");
        };
        let NodeContent::Groups(days) = &months[0].content else {
            panic!("month node must hold day groups at Day depth");
        };
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].kind, NodeKind::Day(11));
        assert_eq!(days[1].kind, NodeKind::Day(10));
        assert_eq!(days[1].note_count(), 2);
    }

    #[test]
    fn test_build_skips_unparseable_timestamps() {
        let notes = vec![
            note("good", "2023-01-01T10:00:00Z"),
            note("bad", "not-a-date"),
            note("empty", ""),
        ];
        let hierarchy = Hierarchy::build(&notes, expanded_config());
        assert_eq!(hierarchy.note_count(), 1);
    }

    #[test]
    fn test_build_accepts_naive_timestamps() {
        let notes = vec![note("naive", "2023-06-15T08:00:00")];
        let hierarchy = Hierarchy::build(&notes, expanded_config());
        assert_eq!(hierarchy.note_count(), 1);
        assert_eq!(hierarchy.nodes()[0].kind, NodeKind::Year(2023));
    }

    #[test]
    fn test_start_collapsed_default_applies_to_all_nodes() {
        let notes = vec![note("a", "2023-01-01T10:00:00Z")];
        let hierarchy = Hierarchy::build(&notes, HierarchyConfig::default());
        let year = &hierarchy.nodes()[0];
        assert!(year.collapsed);
        let NodeContent::Groups(months) = &year.content else {
            panic!("year node must hold groups");
        };
        assert!(months[0].collapsed);
    }

    #[test]
    fn test_rebuild_resets_collapse_state() {
        let notes = vec![note("a", "2023-01-01T10:00:00Z")];
        let mut hierarchy = Hierarchy::build(&notes, expanded_config());
        assert!(hierarchy.toggle(&NodePath::year(2023)));
        assert!(hierarchy.nodes()[0].collapsed);

        let rebuilt = Hierarchy::build(&notes, expanded_config());
        assert!(!rebuilt.nodes()[0].collapsed);
    }

    #[test]
    fn test_toggle_unknown_path_returns_false() {
        let notes = vec![note("a", "2023-01-01T10:00:00Z")];
        let mut hierarchy = Hierarchy::build(&notes, expanded_config());
        assert!(!hierarchy.toggle(&NodePath::year(1999)));
        assert!(!hierarchy.toggle(&NodePath::month(2023, 7)));
        // Day paths never resolve at Month depth.
        assert!(!hierarchy.toggle(&NodePath::day(2023, 0, 1)));
    }

    #[test]
    fn test_count_visible_all_expanded_equals_note_count() {
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2023-01-01T11:00:00Z"),
            note("c", "2023-02-14T09:00:00Z"),
            note("d", "2022-06-10T09:30:00Z"),
        ];
        let hierarchy = Hierarchy::build(&notes, expanded_config());
        assert_eq!(hierarchy.visible_count(), 4);
        assert_eq!(hierarchy.visible_count(), hierarchy.note_count());
    }

    #[test]
    fn test_count_visible_collapsed_month_counts_as_one() {
        // Two January notes and one February note under one year;
        // collapsing January with the year expanded presents 2 items.
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2023-01-01T11:00:00Z"),
            note("c", "2023-02-14T09:00:00Z"),
        ];
        let mut hierarchy = Hierarchy::build(&notes, expanded_config());
        assert!(hierarchy.set_collapsed(&NodePath::month(2023, 0), true));
        assert_eq!(hierarchy.visible_count(), 2);
    }

    #[test]
    fn test_count_visible_collapsed_year_counts_as_one() {
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2023-02-14T09:00:00Z"),
            note("c", "2022-06-10T09:30:00Z"),
        ];
        let mut hierarchy = Hierarchy::build(&notes, expanded_config());
        assert!(hierarchy.set_collapsed(&NodePath::year(2023), true));
        assert_eq!(hierarchy.visible_count(), 2);
    }

    #[test]
    fn test_collapsing_strictly_decreases_visible_count() {
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2023-01-02T10:00:00Z"),
            note("c", "2023-02-14T09:00:00Z"),
        ];
        let mut hierarchy = Hierarchy::build(&notes, expanded_config());
        let before = hierarchy.visible_count();
        hierarchy.set_collapsed(&NodePath::month(2023, 0), true);
        assert!(hierarchy.visible_count() < before);
    }

    #[test]
    fn test_set_all_collapsed() {
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2022-06-10T09:30:00Z"),
        ];
        let mut hierarchy = Hierarchy::build(&notes, HierarchyConfig::default());
        hierarchy.set_all_collapsed(false);
        assert_eq!(hierarchy.visible_count(), 2);
        hierarchy.set_all_collapsed(true);
        // One unit per collapsed year.
        assert_eq!(hierarchy.visible_count(), 2);
        assert!(hierarchy.nodes().iter().all(|n| n.collapsed));
    }

    #[test]
    fn test_child_keys_unique_within_parent() {
        let notes = vec![
            note("a", "2023-01-01T10:00:00Z"),
            note("b", "2023-01-15T10:00:00Z"),
            note("c", "2023-01-31T10:00:00Z"),
        ];
        let hierarchy = Hierarchy::build(&notes, expanded_config());
        let NodeContent::Groups(months) = &hierarchy.nodes()[0].content else {
            panic!("year node must hold groups");
        };
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].note_count(), 3);
    }

    #[test]
    fn test_empty_input_builds_empty_hierarchy() {
        let hierarchy = Hierarchy::build(&[], HierarchyConfig::default());
        assert!(hierarchy.is_empty());
        assert_eq!(hierarchy.visible_count(), 0);
        assert_eq!(hierarchy.note_count(), 0);
    }
}
