//! Presenter feed: flattens a hierarchy into a display-ready sequence.
//!
//! Traversal is depth-first in the builder's descending order. A collapsed
//! node emits exactly one summary item (aggregate count + date label) and
//! is not descended into; an expanded deepest-level node emits one item per
//! note, keyed by the note's own document identifier so re-renders across
//! rebuilds stay idempotent.

use serde::Serialize;

use crate::models::EnrichedNote;
use crate::timeline::{Hierarchy, NodeContent, NodeKind, NodePath, TimeNode};

/// Swedish month names, indexed by 0-based month.
const MONTH_NAMES_SV: [&str; 12] = [
    "januari",
    "februari",
    "mars",
    "april",
    "maj",
    "juni",
    "juli",
    "augusti",
    "september",
    "oktober",
    "november",
    "december",
];

/// One entry of the display feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayItem {
    /// A collapsed node standing in for its hidden subtree.
    Summary {
        /// Stable identifier derived from the node's position.
        id: String,
        /// Human-readable label, e.g. `"2023 (14 notes hidden)"`.
        label: String,
        /// Number of notes subsumed by the collapsed node.
        hidden: usize,
        /// Back-reference for toggling the node open.
        path: NodePath,
    },
    /// A visible note.
    Note {
        /// Stable identifier derived from the note's document identifier.
        id: String,
        note: EnrichedNote,
    },
}

/// Walk the tree honoring collapse state and produce the ordered feed.
pub fn flatten(hierarchy: &Hierarchy) -> Vec<DisplayItem> {
    let mut items = Vec::new();
    for node in hierarchy.nodes() {
        flatten_node(node, None, None, &mut items);
    }
    items
}

fn flatten_node(
    node: &TimeNode,
    year: Option<i32>,
    month: Option<u32>,
    items: &mut Vec<DisplayItem>,
) {
    let (path, date_label) = match node.kind {
        NodeKind::Year(y) => (NodePath::year(y), y.to_string()),
        NodeKind::Month(m) => {
            let y = year.unwrap_or_default();
            // "month/year" with a 1-based display month.
            (NodePath::month(y, m), format!("{}/{}", m + 1, y))
        }
        NodeKind::Day(d) => {
            let y = year.unwrap_or_default();
            let m = month.unwrap_or_default();
            (NodePath::day(y, m, d), format!("{} {} {}", d, month_name(m), y))
        }
    };

    if node.collapsed {
        let hidden = node.note_count();
        items.push(DisplayItem::Summary {
            id: summary_id(&path),
            label: format!("{} ({} notes hidden)", date_label, hidden),
            hidden,
            path,
        });
        return;
    }

    match &node.content {
        NodeContent::Groups(children) => {
            let (child_year, child_month) = match node.kind {
                NodeKind::Year(y) => (Some(y), None),
                NodeKind::Month(m) => (year, Some(m)),
                NodeKind::Day(_) => (year, month),
            };
            for child in children {
                flatten_node(child, child_year, child_month, items);
            }
        }
        NodeContent::Notes(notes) => {
            for note in notes {
                items.push(DisplayItem::Note {
                    id: note.display_key().to_string(),
                    note: note.clone(),
                });
            }
        }
    }
}

fn summary_id(path: &NodePath) -> String {
    match (path.month, path.day) {
        (None, _) => format!("year-{}", path.year),
        (Some(m), None) => format!("month-{}-{}", path.year, m),
        (Some(m), Some(d)) => format!("day-{}-{}-{}", path.year, m, d),
    }
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES_SV
        .get(month as usize)
        .copied()
        .unwrap_or("okänd")
}
