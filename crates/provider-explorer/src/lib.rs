// Provider Explorer library exports

pub mod app;
pub mod config;
pub mod entities;
pub mod file_manager;
pub mod schema_source;
pub mod status_manager;
pub mod ui;
pub mod ui_state;

pub use app::{App, ExportDocument, Focus, Mode, Stage};
pub use config::Config;
pub use entities::{EntityCatalog, EntityKind};
pub use ui_state::UIState;
