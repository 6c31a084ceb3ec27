use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use schematree::{BrowserEvent, BrowserOutcome, SchemaBrowser, ViewMode};

use crate::config::Config;
use crate::entities::{short_provider_name, EntityCatalog};
use crate::file_manager::FileManager;
use crate::schema_source::SchemaEvent;
use crate::ui_state::UIState;

/// Height used until the first frame reports the real pane size.
const INITIAL_TREE_HEIGHT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Filter,
    InstancePrompt,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Browse,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Entities,
    Tree,
}

/// A finished export, shown full screen until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub entity: String,
    pub mode: ViewMode,
    pub content: String,
}

impl ExportDocument {
    pub fn file_name(&self) -> String {
        let suffix = match self.mode {
            ViewMode::Arguments => "variables",
            ViewMode::Attributes => "outputs",
        };
        format!("{}_{}.tf", self.entity, suffix)
    }
}

pub struct App {
    pub config: Config,
    pub ui_state: UIState,
    pub file_manager: FileManager,
    pub catalog: EntityCatalog,
    pub browser: SchemaBrowser,
    stage: Stage,
    focus: Focus,
    provider_filter: Option<String>,
    export: Option<ExportDocument>,
}

impl App {
    pub async fn new(provider_filter: Option<String>) -> Result<Self> {
        let config = Config::load().await?;
        Ok(Self::with_config(config, provider_filter))
    }

    pub fn with_config(config: Config, provider_filter: Option<String>) -> Self {
        let browser = SchemaBrowser::new(INITIAL_TREE_HEIGHT, config.tree.glyphs());
        Self {
            config,
            ui_state: UIState::new(),
            file_manager: FileManager::new(),
            catalog: EntityCatalog::empty(),
            browser,
            stage: Stage::Loading,
            focus: Focus::Entities,
            provider_filter,
            export: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn mode(&self) -> Mode {
        self.ui_state.mode()
    }

    pub fn export(&self) -> Option<&ExportDocument> {
        self.export.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.ui_state.should_quit()
    }

    pub fn show_help(&self) -> bool {
        self.ui_state.is_help_shown()
    }

    pub fn status_message(&self) -> &str {
        self.ui_state.status_message()
    }

    pub fn quit(&mut self) {
        self.ui_state.quit();
    }

    pub fn update_status(&mut self) {
        self.ui_state.update_status();
    }

    pub fn apply_schema_event(&mut self, event: SchemaEvent) {
        match event {
            SchemaEvent::Loaded { path, schemas } => {
                self.catalog = EntityCatalog::from_schemas(&schemas, self.provider_filter.as_deref());
                self.stage = Stage::Browse;
                self.focus = Focus::Entities;
                self.sync_status_context();

                if self.catalog.provider_count() == 0 {
                    let message = match &self.provider_filter {
                        Some(provider) => format!("No provider named '{}' in {}", provider, path.display()),
                        None => format!("No providers in {}", path.display()),
                    };
                    self.ui_state.set_warning_message(message);
                } else {
                    self.ui_state.set_success_message(format!(
                        "Loaded {} providers from {}",
                        self.catalog.provider_count(),
                        path.display()
                    ));
                }
            }
            SchemaEvent::Failed { path, error } => {
                self.stage = Stage::Browse;
                self.ui_state.status_manager.set_permanent(
                    format!("Could not load {}: {}", path.display(), error),
                    crate::status_manager::MessageType::Error,
                );
            }
        }
    }

    fn sync_status_context(&mut self) {
        let status = &mut self.ui_state.status_manager;
        status.set_provider(self.catalog.provider_name().map(|p| short_provider_name(p).to_string()));
        status.set_kind(Some(self.catalog.kind().title().to_string()));
        status.set_filter(self.catalog.filter());
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.ui_state.mode() {
            Mode::Help => self.handle_help_key(key),
            Mode::Filter => self.handle_filter_key(key),
            Mode::InstancePrompt => self.handle_prompt_key(key),
            Mode::Normal => match self.stage {
                Stage::Loading => self.handle_global_key(key),
                Stage::Browse => self.handle_browse_key(key),
                Stage::Export => self.handle_export_key(key).await?,
            },
        }
        Ok(())
    }

    fn handle_global_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('?') => self.ui_state.toggle_help(),
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            self.ui_state.hide_help();
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Entities if self.browser.schema().is_some() => Focus::Tree,
                    _ => Focus::Entities,
                };
            }
            _ => match self.focus {
                Focus::Entities => self.handle_entities_key(key),
                Focus::Tree => self.handle_tree_key(key),
            },
        }
    }

    fn handle_entities_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.catalog.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.catalog.move_up(),
            KeyCode::PageDown => self.catalog.move_page_down(),
            KeyCode::PageUp => self.catalog.move_page_up(),
            KeyCode::Char('/') => self.ui_state.enter_filter_mode(self.catalog.filter()),
            KeyCode::Char('t') => {
                self.catalog.toggle_kind();
                self.sync_status_context();
            }
            KeyCode::Char('p') => {
                self.catalog.next_provider();
                self.sync_status_context();
            }
            KeyCode::Esc => {
                self.catalog.clear_filter();
                self.sync_status_context();
            }
            KeyCode::Enter => self.open_selected_entity(),
            _ => self.handle_global_key(key),
        }
    }

    fn open_selected_entity(&mut self) {
        let Some(entity) = self.catalog.selected() else {
            self.ui_state
                .set_info_message("No entity to open".to_string());
            return;
        };
        let event = BrowserEvent::EntitySelected {
            name: entity.name.clone(),
            block: entity.block.clone(),
        };
        let name = entity.name.clone();
        if self.browser.handle(event) == BrowserOutcome::Rebuilt {
            self.focus = Focus::Tree;
            log::info!("Opened entity {}", name);
        }
    }

    fn handle_tree_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('a') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.browser.toggle_select_all();
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.browser.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.browser.move_up(),
            KeyCode::PageDown => self.browser.move_page_down(),
            KeyCode::PageUp => self.browser.move_page_up(),
            KeyCode::Char(' ') => {
                self.browser.toggle_current();
            }
            KeyCode::Char('a') => {
                self.browser.handle(BrowserEvent::ToggleMode);
            }
            KeyCode::Char('e') => self.request_export(),
            KeyCode::Esc => {
                if self.browser.selected_paths().is_empty() {
                    self.focus = Focus::Entities;
                } else {
                    self.browser.clear_selection();
                }
            }
            _ => self.handle_global_key(key),
        }
    }

    fn request_export(&mut self) {
        if self.browser.selected_paths().is_empty() {
            self.ui_state
                .set_info_message("Select at least one node to export".to_string());
            return;
        }
        match self.browser.handle(BrowserEvent::ExportRequested) {
            BrowserOutcome::Exported(content) => self.show_export(content),
            BrowserOutcome::NeedsInstanceName => {
                let initial = self.config.export.default_instance.clone();
                self.ui_state.enter_instance_prompt(&initial);
            }
            BrowserOutcome::Rebuilt | BrowserOutcome::Nothing => {}
        }
    }

    fn show_export(&mut self, content: String) {
        self.export = Some(ExportDocument {
            entity: self.browser.entity().unwrap_or_default().to_string(),
            mode: self.browser.mode(),
            content,
        });
        self.stage = Stage::Export;
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.catalog.clear_filter();
                self.ui_state.enter_normal_mode();
            }
            KeyCode::Enter => self.ui_state.enter_normal_mode(),
            KeyCode::Backspace => {
                self.ui_state.pop_input();
                self.catalog.pop_filter_char();
            }
            KeyCode::Char(c) => {
                self.ui_state.push_input(c);
                self.catalog.push_filter_char(c);
            }
            _ => {}
        }
        self.sync_status_context();
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.ui_state.enter_normal_mode(),
            KeyCode::Enter => {
                let instance = self.ui_state.input_buffer().to_string();
                match self.browser.export_attributes(&instance) {
                    Ok(content) => {
                        self.ui_state.enter_normal_mode();
                        self.show_export(content);
                    }
                    Err(e) => {
                        log::debug!("Instance name rejected: {}", e);
                        self.ui_state
                            .set_warning_message("Instance name cannot be empty".to_string());
                    }
                }
            }
            KeyCode::Backspace => self.ui_state.pop_input(),
            KeyCode::Char(c) => self.ui_state.push_input(c),
            _ => {}
        }
    }

    async fn handle_export_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.export = None;
                self.stage = Stage::Browse;
                self.focus = Focus::Tree;
            }
            KeyCode::Char('w') => self.write_export().await,
            _ => self.handle_global_key(key),
        }
        Ok(())
    }

    async fn write_export(&mut self) {
        let Some(document) = &self.export else {
            return;
        };
        let path = self.config.export.output_dir().join(document.file_name());
        match self.file_manager.write_export(&path, &document.content).await {
            Ok(message) => self.ui_state.set_success_message(message),
            Err(e) => {
                log::error!("Export write failed: {}", e);
                self.ui_state.set_error_message(format!("Write failed: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schematree::ProviderSchemas;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{
        "format_version": "1.0",
        "provider_schemas": {
            "registry.terraform.io/hashicorp/aws": {
                "resource_schemas": {
                    "aws_instance": {
                        "block": {
                            "attributes": {
                                "ami": { "type": "string", "required": true },
                                "id": { "type": "string", "computed": true }
                            }
                        }
                    }
                }
            }
        }
    }"#;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_app(config: Config) -> App {
        let mut app = App::with_config(config, None);
        app.apply_schema_event(SchemaEvent::Loaded {
            path: PathBuf::from("schema.json"),
            schemas: ProviderSchemas::from_json(SCHEMA).unwrap(),
        });
        app
    }

    async fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(key(code)).await.unwrap();
    }

    #[tokio::test]
    async fn test_app_creation() {
        let app = App::with_config(Config::default(), None);
        assert_eq!(app.stage(), Stage::Loading);
        assert_eq!(app.mode(), Mode::Normal);
        assert!(!app.should_quit());
        assert!(app.export().is_none());
    }

    #[tokio::test]
    async fn test_schema_events() {
        let app = loaded_app(Config::default());
        assert_eq!(app.stage(), Stage::Browse);
        assert_eq!(app.catalog.len(), 1);
        assert_eq!(
            app.ui_state.status_manager.context_line(),
            "provider=aws | type=Resources"
        );

        let mut failed = App::with_config(Config::default(), None);
        failed.apply_schema_event(SchemaEvent::Failed {
            path: PathBuf::from("missing.json"),
            error: "File not found".to_string(),
        });
        assert!(failed.status_message().contains("missing.json"));
        assert!(failed.catalog.is_empty());
    }

    #[tokio::test]
    async fn test_arguments_export_flow() {
        let mut app = loaded_app(Config::default());
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.focus(), Focus::Tree);

        // nothing selected yet
        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.stage(), Stage::Browse);

        press(&mut app, KeyCode::Char(' ')).await;
        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.stage(), Stage::Export);
        let document = app.export().unwrap();
        assert!(document.content.contains("variable \"ami\""));
        assert_eq!(document.file_name(), "aws_instance_variables.tf");

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.stage(), Stage::Browse);
        assert!(app.export().is_none());
    }

    #[tokio::test]
    async fn test_attributes_export_prompts_for_instance() {
        let mut app = loaded_app(Config::default());
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Char('a')).await;
        app.handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.mode(), Mode::InstancePrompt);
        assert_eq!(app.ui_state.input_buffer(), "main");

        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace).await;
        }
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.mode(), Mode::InstancePrompt);

        for c in "web".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.mode(), Mode::Normal);
        let document = app.export().unwrap();
        assert!(document.content.contains("value = aws_instance.web.id"));
        assert_eq!(document.file_name(), "aws_instance_outputs.tf");
    }

    #[tokio::test]
    async fn test_write_export_to_output_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.export.output_dir = Some(dir.path().to_path_buf());
        let mut app = loaded_app(config);

        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Char(' ')).await;
        press(&mut app, KeyCode::Char('e')).await;
        press(&mut app, KeyCode::Char('w')).await;

        let written = std::fs::read_to_string(dir.path().join("aws_instance_variables.tf")).unwrap();
        assert_eq!(written, app.export().unwrap().content);
        assert!(app.status_message().starts_with("Wrote"));
    }

    #[tokio::test]
    async fn test_filter_mode() {
        let mut app = loaded_app(Config::default());
        press(&mut app, KeyCode::Char('/')).await;
        assert_eq!(app.mode(), Mode::Filter);
        for c in "zzz".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        assert!(app.catalog.is_empty());
        assert!(app.ui_state.status_manager.context_line().contains("filter: \"zzz\""));

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(app.catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_help_and_quit() {
        let mut app = loaded_app(Config::default());
        press(&mut app, KeyCode::Char('?')).await;
        assert!(app.show_help());
        press(&mut app, KeyCode::Esc).await;
        assert!(!app.show_help());

        press(&mut app, KeyCode::Char('q')).await;
        assert!(app.should_quit());
    }
}
