use std::collections::HashMap;

use crate::graph::NodeId;
use crate::path::SchemaPath;

/// Per-node selection state.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    states: HashMap<NodeId, bool>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.states.get(&id).copied().unwrap_or(false)
    }

    /// Flips a single node and returns its new state.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        let state = self.states.entry(id).or_insert(false);
        *state = !*state;
        *state
    }

    pub fn set(&mut self, id: NodeId, selected: bool) {
        self.states.insert(id, selected);
    }

    /// Flips `id` and gives every node whose path lies strictly below it the
    /// same state. Nodes without a known path fall back to a plain toggle.
    pub fn toggle_cascading(&mut self, id: NodeId, paths: &HashMap<NodeId, SchemaPath>) -> bool {
        let Some(base) = paths.get(&id) else {
            return self.toggle(id);
        };

        let desired = !self.is_selected(id);
        self.set(id, desired);
        for (other, path) in paths {
            if *other != id && path.is_strict_descendant_of(base) {
                self.set(*other, desired);
            }
        }
        desired
    }

    pub fn select_all(&mut self, visible: &[NodeId]) {
        for id in visible {
            self.states.insert(*id, true);
        }
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn purge(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.states.remove(id);
        }
    }

    /// Selected ids in ascending order.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .states
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn count(&self) -> usize {
        self.states.values().filter(|selected| **selected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TreeGraph;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut graph = TreeGraph::new();
        (0..n)
            .map(|i| graph.add_node(None, format!("n{}", i), ()).unwrap())
            .collect()
    }

    #[test]
    fn test_toggle_and_set() {
        let ids = ids(2);
        let mut selection = SelectionSet::new();
        assert!(!selection.is_selected(ids[0]));
        assert!(selection.selected_nodes().is_empty());

        assert!(selection.toggle(ids[0]));
        assert!(selection.is_selected(ids[0]));
        assert!(!selection.is_selected(ids[1]));

        selection.toggle(ids[1]);
        assert_eq!(selection.selected_nodes(), vec![ids[0], ids[1]]);

        assert!(!selection.toggle(ids[0]));
        assert_eq!(selection.selected_nodes(), vec![ids[1]]);

        selection.set(ids[1], false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_cascade_follows_paths() {
        let ids = ids(4);
        let paths: HashMap<NodeId, SchemaPath> = [
            (ids[0], SchemaPath::from(["block"])),
            (ids[1], SchemaPath::from(["block", "attr"])),
            (ids[2], SchemaPath::from(["block", "inner", "attr"])),
            (ids[3], SchemaPath::from(["sibling"])),
        ]
        .into_iter()
        .collect();

        let mut selection = SelectionSet::new();
        assert!(selection.toggle_cascading(ids[0], &paths));
        assert_eq!(selection.selected_nodes(), vec![ids[0], ids[1], ids[2]]);

        assert!(!selection.toggle_cascading(ids[0], &paths));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clear_and_purge() {
        let ids = ids(3);
        let mut selection = SelectionSet::new();
        selection.select_all(&ids);
        assert_eq!(selection.count(), 3);

        selection.purge(&ids[..1]);
        assert_eq!(selection.selected_nodes(), vec![ids[1], ids[2]]);

        selection.clear();
        assert!(selection.selected_nodes().is_empty());
        selection.clear();
        assert!(selection.selected_nodes().is_empty());
    }
}
