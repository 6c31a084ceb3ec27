pub mod browser;
pub mod error;
pub mod export;
pub mod graph;
pub mod path;
pub mod projector;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod selection;
pub mod tree_view;
pub mod viewport;

pub use browser::{BrowserEvent, BrowserOutcome, SchemaBrowser};
pub use error::{Error, Result};
pub use export::{eligible_paths, export, ExportRequest};
pub use graph::{NodeId, TreeGraph};
pub use path::SchemaPath;
pub use projector::{project, PathIndex, Projection, SchemaNode, ViewMode};
pub use render::{Glyphs, Renderable, TreeLine};
pub use resolve::resolve;
pub use schema::{Attribute, AttributeType, Block, EntitySchema, NestedBlock, NestingMode, ProviderSchemas};
pub use selection::SelectionSet;
pub use tree_view::TreeView;
pub use viewport::ViewportCursor;
