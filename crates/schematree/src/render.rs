use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, TreeGraph};
use crate::selection::SelectionSet;
use crate::viewport::ViewportCursor;

const CURSOR_MARKER: &str = "> ";
const NO_CURSOR_MARKER: &str = "  ";
const SELECTED_MARKER: &str = "[x] ";
const UNSELECTED_MARKER: &str = "[ ] ";

/// Anything that can be shown as a tree node.
pub trait Renderable {
    fn view(&self) -> String;
}

impl Renderable for String {
    fn view(&self) -> String {
        self.clone()
    }
}

impl Renderable for &str {
    fn view(&self) -> String {
        (*self).to_string()
    }
}

/// Connector strings used when drawing the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyphs {
    pub indent: String,
    pub branch: String,
    pub fork: String,
    pub leaf: String,
    #[serde(default)]
    pub margin: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            indent: String::from("   "),
            branch: String::from("│  "),
            fork: String::from("├──"),
            leaf: String::from("└──"),
            margin: String::new(),
        }
    }
}

impl Glyphs {
    /// Plain ASCII connectors for terminals without box-drawing support.
    pub fn ascii() -> Self {
        Self {
            indent: String::from("   "),
            branch: String::from("|  "),
            fork: String::from("|--"),
            leaf: String::from("`--"),
            margin: String::new(),
        }
    }
}

/// A single physical output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub node: NodeId,
    /// Index of the owning node in the visible-node sequence.
    pub row: usize,
    pub text: String,
    pub cursor: bool,
    pub selected: bool,
    pub continuation: bool,
}

/// Renders every visible node, then keeps the rows inside the viewport
/// window. A height of zero disables windowing.
pub fn render_lines<T: Renderable>(
    graph: &TreeGraph<T>,
    glyphs: &Glyphs,
    selection: &SelectionSet,
    viewport: &ViewportCursor,
) -> Vec<TreeLine> {
    let rows = graph.visible_rows();
    let window = viewport.window(rows.len());
    let mut lines = Vec::new();

    for (row_idx, row) in rows.iter().enumerate() {
        if !window.contains(&row_idx) {
            continue;
        }
        let Some(payload) = graph.payload(row.id) else {
            continue;
        };

        let depth = row.depth();
        let mut prefix = String::new();
        for ancestor_was_last in &row.lineage[..depth] {
            prefix.push_str(if *ancestor_was_last {
                &glyphs.indent
            } else {
                &glyphs.branch
            });
        }

        let (connector, continued) = if row.is_last_sibling() {
            (&glyphs.leaf, &glyphs.indent)
        } else {
            (&glyphs.fork, &glyphs.branch)
        };

        let cursor = row_idx == viewport.cursor();
        let selected = selection.is_selected(row.id);
        let marker = if cursor { CURSOR_MARKER } else { NO_CURSOR_MARKER };
        let checkbox = if selected {
            SELECTED_MARKER
        } else {
            UNSELECTED_MARKER
        };

        let view = payload.view();
        let mut payload_lines = view.trim_end_matches('\n').split('\n');
        let first = payload_lines.next().unwrap_or_default();
        lines.push(TreeLine {
            node: row.id,
            row: row_idx,
            text: format!("{}{}{}{}{}{}", glyphs.margin, prefix, connector, marker, checkbox, first),
            cursor,
            selected,
            continuation: false,
        });

        let padding = " ".repeat(marker.chars().count() + checkbox.chars().count());
        for rest in payload_lines {
            lines.push(TreeLine {
                node: row.id,
                row: row_idx,
                text: format!("{}{}{}{}{}", glyphs.margin, prefix, continued, padding, rest),
                cursor,
                selected,
                continuation: true,
            });
        }
    }

    lines
}

pub fn render<T: Renderable>(
    graph: &TreeGraph<T>,
    glyphs: &Glyphs,
    selection: &SelectionSet,
    viewport: &ViewportCursor,
) -> String {
    render_lines(graph, glyphs, selection, viewport)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(graph: &TreeGraph<&'static str>, selection: &SelectionSet) -> String {
        render(graph, &Glyphs::default(), selection, &ViewportCursor::new(0))
    }

    #[test]
    fn test_single_branch() {
        let mut graph = TreeGraph::new();
        let a = graph.add_node(None, "a", "a").unwrap();
        graph.add_node(Some(a), "a-a", "a-a").unwrap();

        let expected = "└──> [ ] a\n   └──  [ ] a-a";
        assert_eq!(render_all(&graph, &SelectionSet::new()), expected);
    }

    #[test]
    fn test_sibling_branches_with_selection() {
        let mut graph = TreeGraph::new();
        let a = graph.add_node(None, "a", "a").unwrap();
        graph.add_node(Some(a), "a-a", "a-a").unwrap();
        graph.add_node(Some(a), "a-b", "a-b").unwrap();
        let b = graph.add_node(None, "b", "b").unwrap();
        let ba = graph.add_node(Some(b), "b-a", "b-a").unwrap();

        let mut selection = SelectionSet::new();
        selection.toggle(a);
        selection.toggle(ba);

        let expected = [
            "├──> [x] a",
            "│  ├──  [ ] a-a",
            "│  └──  [ ] a-b",
            "└──  [ ] b",
            "   └──  [x] b-a",
        ]
        .join("\n");
        assert_eq!(render_all(&graph, &selection), expected);
    }

    #[test]
    fn test_hidden_nodes_change_connectors() {
        let mut graph = TreeGraph::new();
        let a = graph.add_node(None, "a", "a").unwrap();
        graph.add_node(Some(a), "a-a", "a-a").unwrap();
        let ab = graph.add_node(Some(a), "a-b", "a-b").unwrap();
        let b = graph.add_node(None, "b", "b").unwrap();
        graph.add_node(Some(b), "b-a", "b-a").unwrap();
        graph.set_visible(ab, false).unwrap();
        graph.set_visible(b, false).unwrap();

        let expected = "└──> [ ] a\n   └──  [ ] a-a";
        assert_eq!(render_all(&graph, &SelectionSet::new()), expected);
    }

    #[test]
    fn test_multiline_payload_uses_continued_prefix() {
        let mut graph = TreeGraph::new();
        graph.add_node(None, "a", "first\nsecond").unwrap();
        graph.add_node(None, "b", "b").unwrap();

        let expected = ["├──> [ ] first", "│        second", "└──  [ ] b"].join("\n");
        assert_eq!(render_all(&graph, &SelectionSet::new()), expected);
    }

    #[test]
    fn test_margin_and_ascii_glyphs() {
        let mut graph = TreeGraph::new();
        graph.add_node(None, "a", "a").unwrap();
        graph.add_node(None, "b", "b").unwrap();

        let glyphs = Glyphs {
            margin: String::from("  "),
            ..Glyphs::ascii()
        };
        let out = render(&graph, &glyphs, &SelectionSet::new(), &ViewportCursor::new(0));
        assert_eq!(out, "  |--> [ ] a\n  `--  [ ] b");
    }

    #[test]
    fn test_window_limits_rows() {
        let mut graph = TreeGraph::new();
        for i in 0..7 {
            graph
                .add_node(None, format!("root{}", i), format!("root{}", i))
                .unwrap();
        }
        let mut viewport = ViewportCursor::new(5);
        let lines = render_lines(&graph, &Glyphs::default(), &SelectionSet::new(), &viewport);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].cursor);
        assert!(lines[4].text.ends_with("root4"));

        for _ in 0..6 {
            viewport.move_down(graph.visible_count());
        }
        let lines = render_lines(&graph, &Glyphs::default(), &SelectionSet::new(), &viewport);
        assert_eq!(lines.first().map(|l| l.row), Some(2));
        assert_eq!(lines.last().map(|l| l.text.as_str()), Some("└──> [ ] root6"));
    }
}
