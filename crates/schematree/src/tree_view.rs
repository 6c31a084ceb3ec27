use crate::error::Result;
use crate::graph::{NodeId, TreeGraph};
use crate::render::{self, Glyphs, Renderable, TreeLine};
use crate::selection::SelectionSet;
use crate::viewport::ViewportCursor;

/// A tree together with its selection and viewport.
#[derive(Debug, Clone)]
pub struct TreeView<T> {
    graph: TreeGraph<T>,
    selection: SelectionSet,
    viewport: ViewportCursor,
}

impl<T> TreeView<T> {
    pub fn new(graph: TreeGraph<T>, height: usize) -> Self {
        Self {
            graph,
            selection: SelectionSet::new(),
            viewport: ViewportCursor::new(height),
        }
    }

    pub fn graph(&self) -> &TreeGraph<T> {
        &self.graph
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn viewport(&self) -> &ViewportCursor {
        &self.viewport
    }

    pub fn add_node(&mut self, parent: Option<NodeId>, key: impl Into<String>, payload: T) -> Result<NodeId> {
        self.graph.add_node(parent, key, payload)
    }

    /// Removes a node with its subtree and forgets their selection state.
    pub fn remove_node(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.graph.remove_node(id);
        self.selection.purge(&removed);
        self.viewport.clamp(self.graph.visible_count());
        removed
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.graph.set_visible(id, visible)?;
        self.viewport.clamp(self.graph.visible_count());
        Ok(())
    }

    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.graph.visible_nodes()
    }

    /// Node under the cursor, if any.
    pub fn current_node(&self) -> Option<NodeId> {
        self.graph.visible_nodes().get(self.viewport.cursor()).copied()
    }

    pub fn set_height(&mut self, height: usize) {
        self.viewport.set_height(height);
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.viewport.clamp(self.graph.visible_count());
    }

    pub fn move_down(&mut self) {
        self.viewport.move_down(self.graph.visible_count());
    }

    pub fn move_up(&mut self) {
        self.viewport.move_up();
    }

    pub fn move_page_down(&mut self) {
        self.viewport.move_page_down(self.graph.visible_count());
    }

    pub fn move_page_up(&mut self) {
        self.viewport.move_page_up(self.graph.visible_count());
    }

    pub fn toggle_selection(&mut self, id: NodeId) -> bool {
        self.selection.toggle(id)
    }

    pub fn set_selection(&mut self, id: NodeId, selected: bool) {
        self.selection.set(id, selected);
    }

    pub fn select_all(&mut self) {
        let visible = self.graph.visible_nodes();
        self.selection.select_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.selected_nodes()
    }
}

impl<T: Renderable> TreeView<T> {
    pub fn render_lines(&self, glyphs: &Glyphs) -> Vec<TreeLine> {
        render::render_lines(&self.graph, glyphs, &self.selection, &self.viewport)
    }

    pub fn render(&self, glyphs: &Glyphs) -> String {
        render::render(&self.graph, glyphs, &self.selection, &self.viewport)
    }
}
