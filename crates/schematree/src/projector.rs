use std::collections::HashMap;
use std::fmt;

use crate::graph::{NodeId, TreeGraph};
use crate::path::SchemaPath;
use crate::render::Renderable;
use crate::schema::{Attribute, Block, NestingMode};

/// Which half of an entity's schema is being browsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Inputs: required and optional attributes.
    #[default]
    Arguments,
    /// Outputs: computed attributes.
    Attributes,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Arguments => ViewMode::Attributes,
            ViewMode::Attributes => ViewMode::Arguments,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Arguments => "Arguments",
            ViewMode::Attributes => "Attributes",
        }
    }

    /// Filter applied to top-level attributes only.
    pub fn includes(&self, attribute: &Attribute) -> bool {
        match self {
            ViewMode::Arguments => !attribute.computed,
            ViewMode::Attributes => attribute.computed,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a schema tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Attribute {
        path: SchemaPath,
        attribute: Attribute,
    },
    Block {
        path: SchemaPath,
        nesting_mode: NestingMode,
    },
}

impl SchemaNode {
    pub fn path(&self) -> &SchemaPath {
        match self {
            SchemaNode::Attribute { path, .. } | SchemaNode::Block { path, .. } => path,
        }
    }

    pub fn name(&self) -> &str {
        self.path().last().unwrap_or_default()
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, SchemaNode::Block { .. })
    }

    pub fn attribute(&self) -> Option<&Attribute> {
        match self {
            SchemaNode::Attribute { attribute, .. } => Some(attribute),
            SchemaNode::Block { .. } => None,
        }
    }

    /// Requirement tag shown after the attribute type.
    pub fn status(&self) -> Option<&'static str> {
        let attribute = self.attribute()?;
        if attribute.required {
            Some("required")
        } else if attribute.optional {
            Some("optional")
        } else if attribute.computed {
            Some("computed")
        } else {
            None
        }
    }
}

impl Renderable for SchemaNode {
    fn view(&self) -> String {
        match self {
            SchemaNode::Attribute { attribute, .. } => {
                let mut text = format!("{} ({})", self.name(), attribute.attr_type.label());
                if let Some(status) = self.status() {
                    text.push_str(&format!(" [{}]", status));
                }
                text
            }
            SchemaNode::Block { .. } => format!("{} [block]", self.name()),
        }
    }
}

/// Two-way mapping between node ids and schema paths for one projection.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    by_node: HashMap<NodeId, SchemaPath>,
    by_path: HashMap<SchemaPath, NodeId>,
}

impl PathIndex {
    fn insert(&mut self, id: NodeId, path: SchemaPath) {
        self.by_path.insert(path.clone(), id);
        self.by_node.insert(id, path);
    }

    pub fn path(&self, id: NodeId) -> Option<&SchemaPath> {
        self.by_node.get(&id)
    }

    pub fn node(&self, path: &SchemaPath) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn paths(&self) -> &HashMap<NodeId, SchemaPath> {
        &self.by_node
    }

    pub fn nodes(&self) -> &HashMap<SchemaPath, NodeId> {
        &self.by_path
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}

/// Result of projecting one schema block.
#[derive(Debug, Clone)]
pub struct Projection {
    pub graph: TreeGraph<SchemaNode>,
    pub index: PathIndex,
    pub mode: ViewMode,
}

impl Projection {
    pub fn is_composite(&self, id: NodeId) -> bool {
        self.graph
            .payload(id)
            .map(SchemaNode::is_composite)
            .unwrap_or(false)
    }
}

/// Builds a fresh tree for `block`.
///
/// Top-level attributes are filtered by `mode`; nested blocks always appear,
/// and every attribute inside a nested block is included regardless of mode.
/// Node keys are the dot-joined paths, so ids need no external counter.
pub fn project(block: &Block, mode: ViewMode) -> Projection {
    let mut projection = Projection {
        graph: TreeGraph::new(),
        index: PathIndex::default(),
        mode,
    };

    for (name, attribute) in &block.attributes {
        if mode.includes(attribute) {
            add_attribute(&mut projection, None, SchemaPath::root(name), attribute);
        }
    }
    for (name, nested) in &block.block_types {
        add_block(
            &mut projection,
            None,
            SchemaPath::root(name),
            nested.nesting_mode,
            &nested.block,
        );
    }

    log::debug!(
        "Projected {} nodes in {} mode",
        projection.graph.len(),
        projection.mode
    );
    projection
}

fn add_attribute(
    projection: &mut Projection,
    parent: Option<NodeId>,
    path: SchemaPath,
    attribute: &Attribute,
) {
    let node = SchemaNode::Attribute {
        path: path.clone(),
        attribute: attribute.clone(),
    };
    match projection.graph.add_node(parent, path.dotted(), node) {
        Ok(id) => projection.index.insert(id, path),
        Err(e) => log::warn!("Skipping attribute '{}': {}", path, e),
    }
}

fn add_block(
    projection: &mut Projection,
    parent: Option<NodeId>,
    path: SchemaPath,
    nesting_mode: NestingMode,
    block: &Block,
) {
    let node = SchemaNode::Block {
        path: path.clone(),
        nesting_mode,
    };
    let id = match projection.graph.add_node(parent, path.dotted(), node) {
        Ok(id) => id,
        Err(e) => {
            log::warn!("Skipping block '{}': {}", path, e);
            return;
        }
    };
    projection.index.insert(id, path.clone());

    for (name, attribute) in &block.attributes {
        add_attribute(projection, Some(id), path.child(name), attribute);
    }
    for (name, nested) in &block.block_types {
        add_block(
            projection,
            Some(id),
            path.child(name),
            nested.nesting_mode,
            &nested.block,
        );
    }
}
