use std::collections::HashMap;

use crate::error::{Error, Result};

/// Dense index of a node inside a [`TreeGraph`] arena.
///
/// Ids are only meaningful for the graph that issued them; a rebuilt graph
/// starts again from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeRecord<T> {
    key: String,
    payload: T,
    visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One entry of a pre-order walk over the visible part of the graph.
///
/// `lineage[i]` tells whether the ancestor at depth `i` was the last visible
/// sibling on its level; the final element describes the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub lineage: Vec<bool>,
}

impl VisibleRow {
    pub fn depth(&self) -> usize {
        self.lineage.len().saturating_sub(1)
    }

    pub fn is_last_sibling(&self) -> bool {
        self.lineage.last().copied().unwrap_or(true)
    }
}

/// Ordered tree stored as an arena of node records.
///
/// Children keep insertion order. A node can only be attached to a parent
/// that already exists, so the structure cannot contain cycles.
#[derive(Debug, Clone)]
pub struct TreeGraph<T> {
    nodes: Vec<Option<NodeRecord<T>>>,
    roots: Vec<NodeId>,
    keys: HashMap<String, NodeId>,
}

impl<T> TreeGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            keys: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        key: impl Into<String>,
        payload: T,
    ) -> Result<NodeId> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidNode("node key cannot be empty".to_string()));
        }
        if self.keys.contains_key(&key) {
            return Err(Error::InvalidNode(format!("duplicate node key '{}'", key)));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(Error::InvalidNode(format!(
                    "parent {} does not exist",
                    parent.index()
                )));
            }
        }

        let id = NodeId(self.nodes.len());
        self.keys.insert(key.clone(), id);
        self.nodes.push(Some(NodeRecord {
            key,
            payload,
            visible: true,
            parent,
            children: Vec::new(),
        }));

        match parent.and_then(|p| self.record_mut(p)) {
            Some(record) => record.children.push(id),
            None => self.roots.push(id),
        }

        Ok(id)
    }

    /// Removes `id` and everything below it, returning every removed id.
    pub fn remove_node(&mut self, id: NodeId) -> Vec<NodeId> {
        let parent = match self.record(id) {
            Some(record) => record.parent,
            None => return Vec::new(),
        };

        match parent.and_then(|p| self.record_mut(p)) {
            Some(record) => record.children.retain(|child| *child != id),
            None => self.roots.retain(|root| *root != id),
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(record) = self.nodes.get_mut(current.0).and_then(Option::take) {
                self.keys.remove(&record.key);
                pending.extend(record.children);
                removed.push(current);
            }
        }
        removed.sort();
        removed
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.record(id).is_some()
    }

    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.record(id).map(|r| r.key.as_str())
    }

    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.record(id).map(|r| &r.payload)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id).and_then(|r| r.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.record(id).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.record(id).map(|r| r.visible).unwrap_or(false)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        match self.record_mut(id) {
            Some(record) => {
                record.visible = visible;
                Ok(())
            }
            None => Err(Error::InvalidNode(format!("node {} does not exist", id.index()))),
        }
    }

    /// Visible node ids in depth-first pre-order. Hidden nodes are pruned
    /// together with their whole subtree.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.visible_rows().into_iter().map(|row| row.id).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows().len()
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut lineage = Vec::new();
        self.collect_rows(&self.roots, &mut lineage, &mut rows);
        rows
    }

    fn collect_rows(&self, siblings: &[NodeId], lineage: &mut Vec<bool>, rows: &mut Vec<VisibleRow>) {
        for (idx, id) in siblings.iter().enumerate() {
            let Some(record) = self.record(*id) else {
                continue;
            };
            if !record.visible {
                continue;
            }

            lineage.push(self.is_last_visible(siblings, idx));
            rows.push(VisibleRow {
                id: *id,
                lineage: lineage.clone(),
            });
            self.collect_rows(&record.children, lineage, rows);
            lineage.pop();
        }
    }

    fn is_last_visible(&self, siblings: &[NodeId], idx: usize) -> bool {
        !siblings[idx + 1..].iter().any(|id| self.is_visible(*id))
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord<T>> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn record_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord<T>> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl<T> Default for TreeGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}
