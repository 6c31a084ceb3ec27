use crate::error::{Error, Result};
use crate::export::{self, ExportRequest};
use crate::graph::{NodeId, TreeGraph};
use crate::path::SchemaPath;
use crate::projector::{self, PathIndex, SchemaNode, ViewMode};
use crate::render::{Glyphs, TreeLine};
use crate::schema::Block;
use crate::tree_view::TreeView;

/// Lines reserved for the title and the summary.
const CHROME_LINES: usize = 2;

pub const NAVIGATION_HINT: &str =
    "↑/↓ or j/k to navigate, space to select, ctrl+a to select all, 'a' to toggle mode";

/// Input the browser reacts to.
#[derive(Debug, Clone)]
pub enum BrowserEvent {
    EntitySelected { name: String, block: Block },
    ToggleMode,
    ExportRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserOutcome {
    Rebuilt,
    Exported(String),
    /// Attribute exports need an instance name first, see
    /// [`SchemaBrowser::export_attributes`].
    NeedsInstanceName,
    Nothing,
}

/// Interactive schema tree for one entity.
#[derive(Debug, Clone)]
pub struct SchemaBrowser {
    entity: Option<String>,
    schema: Option<Block>,
    mode: ViewMode,
    view: TreeView<SchemaNode>,
    index: PathIndex,
    glyphs: Glyphs,
    height: usize,
}

impl SchemaBrowser {
    pub fn new(height: usize, glyphs: Glyphs) -> Self {
        Self {
            entity: None,
            schema: None,
            mode: ViewMode::Arguments,
            view: TreeView::new(TreeGraph::new(), tree_height(height)),
            index: PathIndex::default(),
            glyphs,
            height,
        }
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn schema(&self) -> Option<&Block> {
        self.schema.as_ref()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn tree(&self) -> &TreeView<SchemaNode> {
        &self.view
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    pub fn handle(&mut self, event: BrowserEvent) -> BrowserOutcome {
        match event {
            BrowserEvent::EntitySelected { name, block } => {
                self.set_schema(name, block);
                BrowserOutcome::Rebuilt
            }
            BrowserEvent::ToggleMode => {
                if self.schema.is_none() {
                    return BrowserOutcome::Nothing;
                }
                self.toggle_mode();
                BrowserOutcome::Rebuilt
            }
            BrowserEvent::ExportRequested => match (self.mode, &self.schema) {
                (_, None) => BrowserOutcome::Nothing,
                (ViewMode::Arguments, Some(schema)) => BrowserOutcome::Exported(export::export(
                    &self.selected_paths(),
                    schema,
                    ExportRequest::Arguments,
                )),
                (ViewMode::Attributes, Some(_)) => BrowserOutcome::NeedsInstanceName,
            },
        }
    }

    /// Shows a new entity, starting over in Arguments mode.
    pub fn set_schema(&mut self, name: impl Into<String>, block: Block) {
        self.entity = Some(name.into());
        self.schema = Some(block);
        self.mode = ViewMode::Arguments;
        self.rebuild();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.rebuild();
    }

    /// Total height available to [`view`](Self::view), chrome included.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.view.set_height(tree_height(height));
    }

    fn rebuild(&mut self) {
        let Some(schema) = &self.schema else {
            return;
        };
        let projection = projector::project(schema, self.mode);
        self.view = TreeView::new(projection.graph, tree_height(self.height));
        self.index = projection.index;
        log::info!(
            "Rebuilt schema tree for {} ({} mode, {} nodes)",
            self.entity.as_deref().unwrap_or("?"),
            self.mode,
            self.index.len()
        );
    }

    pub fn move_down(&mut self) {
        self.view.move_down();
    }

    pub fn move_up(&mut self) {
        self.view.move_up();
    }

    pub fn move_page_down(&mut self) {
        self.view.move_page_down();
    }

    pub fn move_page_up(&mut self) {
        self.view.move_page_up();
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.view.current_node()
    }

    pub fn current_path(&self) -> Option<&SchemaPath> {
        self.current_node().and_then(|id| self.index.path(id))
    }

    /// Space: blocks cascade to their descendants, attributes flip alone.
    pub fn toggle_current(&mut self) -> Option<bool> {
        let id = self.current_node()?;
        Some(self.toggle_node(id))
    }

    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        let composite = self
            .view
            .graph()
            .payload(id)
            .map(SchemaNode::is_composite)
            .unwrap_or(false);
        if composite {
            self.view
                .selection_mut()
                .toggle_cascading(id, self.index.paths())
        } else {
            self.view.toggle_selection(id)
        }
    }

    /// Selects everything visible, or clears when that is already the case.
    pub fn toggle_select_all(&mut self) {
        let visible = self.view.visible_nodes();
        let selected = self.view.selection().count();
        if !visible.is_empty() && selected >= visible.len() {
            self.view.clear_selection();
        } else {
            self.view.select_all();
        }
    }

    pub fn select_all(&mut self) {
        self.view.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
    }

    pub fn selected_paths(&self) -> Vec<SchemaPath> {
        self.view
            .selected_nodes()
            .into_iter()
            .filter_map(|id| self.index.path(id).cloned())
            .collect()
    }

    /// Output export for the current entity; blank instance names are refused.
    pub fn export_attributes(&self, instance: &str) -> Result<String> {
        let instance = instance.trim();
        if instance.is_empty() {
            return Err(Error::InvalidInstance("instance name cannot be blank".to_string()));
        }
        let (Some(entity), Some(schema)) = (&self.entity, &self.schema) else {
            return Err(Error::NotFound("no entity selected".to_string()));
        };
        Ok(export::export(
            &self.selected_paths(),
            schema,
            ExportRequest::Attributes { entity, instance },
        ))
    }

    pub fn title(&self) -> String {
        format!("Schema ({})", self.mode)
    }

    pub fn summary(&self) -> String {
        let selected = self.view.selection().count();
        if selected > 0 {
            format!(
                "Selected: {} nodes (press 'e' to export, esc to clear)",
                selected
            )
        } else {
            NAVIGATION_HINT.to_string()
        }
    }

    pub fn tree_lines(&self) -> Vec<TreeLine> {
        self.view.render_lines(&self.glyphs)
    }

    /// Title, windowed tree and summary as one text block.
    pub fn view(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.title(),
            self.view.render(&self.glyphs),
            self.summary()
        )
    }
}

fn tree_height(total: usize) -> usize {
    total.saturating_sub(CHROME_LINES).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeType, NestedBlock};

    fn schema() -> Block {
        let mut nested = Block::default();
        nested.attributes.insert(
            "subnet_id".into(),
            Attribute {
                attr_type: AttributeType::String,
                optional: true,
                ..Attribute::default()
            },
        );
        let mut block = Block::default();
        block.attributes.insert(
            "ami".into(),
            Attribute {
                attr_type: AttributeType::String,
                required: true,
                ..Attribute::default()
            },
        );
        block.attributes.insert(
            "id".into(),
            Attribute {
                attr_type: AttributeType::String,
                computed: true,
                ..Attribute::default()
            },
        );
        block.block_types.insert(
            "network_config".into(),
            NestedBlock {
                block: nested,
                ..NestedBlock::default()
            },
        );
        block
    }

    fn browser() -> SchemaBrowser {
        let mut browser = SchemaBrowser::new(20, Glyphs::default());
        let outcome = browser.handle(BrowserEvent::EntitySelected {
            name: "aws_instance".into(),
            block: schema(),
        });
        assert_eq!(outcome, BrowserOutcome::Rebuilt);
        browser
    }

    #[test]
    fn test_view_layout() {
        let browser = browser();
        let expected = [
            "Schema (Arguments)",
            "├──> [ ] ami (string) [required]",
            "└──  [ ] network_config [block]",
            "   └──  [ ] subnet_id (string) [optional]",
            NAVIGATION_HINT,
        ]
        .join("\n");
        assert_eq!(browser.view(), expected);
    }

    #[test]
    fn test_summary_counts_selection() {
        let mut browser = browser();
        browser.move_down();
        assert_eq!(browser.toggle_current(), Some(true));
        assert_eq!(
            browser.summary(),
            "Selected: 2 nodes (press 'e' to export, esc to clear)"
        );
    }

    #[test]
    fn test_mode_toggle_discards_selection() {
        let mut browser = browser();
        browser.select_all();
        assert_eq!(browser.selected_paths().len(), 3);

        assert_eq!(browser.handle(BrowserEvent::ToggleMode), BrowserOutcome::Rebuilt);
        assert_eq!(browser.mode(), ViewMode::Attributes);
        assert!(browser.selected_paths().is_empty());
        assert_eq!(browser.tree().viewport().cursor(), 0);
        assert!(browser.view().starts_with("Schema (Attributes)\n├──> [ ] id (string) [computed]"));
    }

    #[test]
    fn test_toggle_select_all_clears_when_full() {
        let mut browser = browser();
        browser.toggle_select_all();
        assert_eq!(browser.selected_paths().len(), 3);
        browser.toggle_select_all();
        assert!(browser.selected_paths().is_empty());
    }

    #[test]
    fn test_export_flow_per_mode() {
        let mut browser = browser();
        browser.select_all();
        match browser.handle(BrowserEvent::ExportRequested) {
            BrowserOutcome::Exported(doc) => assert!(doc.contains("variable \"ami\"")),
            other => panic!("unexpected outcome: {:?}", other),
        }

        browser.toggle_mode();
        assert_eq!(
            browser.handle(BrowserEvent::ExportRequested),
            BrowserOutcome::NeedsInstanceName
        );
        assert_eq!(
            browser.export_attributes("   "),
            Err(Error::InvalidInstance("instance name cannot be blank".to_string()))
        );
        browser.select_all();
        let doc = browser.export_attributes(" web ").unwrap();
        assert!(doc.contains("value = aws_instance.web.id"));
    }

    #[test]
    fn test_events_without_schema_do_nothing() {
        let mut browser = SchemaBrowser::new(10, Glyphs::default());
        assert_eq!(browser.handle(BrowserEvent::ToggleMode), BrowserOutcome::Nothing);
        assert_eq!(browser.handle(BrowserEvent::ExportRequested), BrowserOutcome::Nothing);
        assert_eq!(browser.toggle_current(), None);
        assert!(matches!(browser.export_attributes("main"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_small_height_still_shows_cursor_row() {
        let mut browser = browser();
        browser.set_height(1);
        assert_eq!(browser.tree_lines().len(), 1);
        browser.move_down();
        browser.move_down();
        let lines = browser.tree_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].cursor);
        assert!(lines[0].text.contains("subnet_id"));
    }
}
