use anyhow::Result;
use directories::ProjectDirs;
use ratatui::style::Color;
use schematree::Glyphs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

const MAX_MARGIN_WIDTH: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tree: TreeConfig,
    pub export: ExportConfig,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlyphStyle {
    Unicode,
    Ascii,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub glyph_style: GlyphStyle,
    #[serde(default)]
    pub custom_glyphs: Option<Glyphs>,
    #[serde(default)]
    pub margin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub default_instance: String,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub selection_color: Option<String>,
    #[serde(default)]
    pub status_background: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree: TreeConfig {
                glyph_style: GlyphStyle::Unicode,
                custom_glyphs: None,
                margin: String::new(),
            },
            export: ExportConfig {
                default_instance: String::from("main"),
                output_dir: None,
            },
            theme: Theme {
                name: String::from("dark"),
                accent_color: Some(String::from("#FFD166")),
                selection_color: Some(String::from("#06D6A0")),
                status_background: Some(String::from("#005F87")),
            },
        }
    }
}

impl TreeConfig {
    /// Connector set handed to the tree renderer.
    pub fn glyphs(&self) -> Glyphs {
        let base = match (self.glyph_style, &self.custom_glyphs) {
            (GlyphStyle::Ascii, _) => Glyphs::ascii(),
            (GlyphStyle::Custom, Some(custom)) => custom.clone(),
            _ => Glyphs::default(),
        };
        if self.margin.is_empty() {
            base
        } else {
            Glyphs {
                margin: self.margin.clone(),
                ..base
            }
        }
    }
}

impl ExportConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Theme {
    pub fn accent(&self) -> Color {
        parse_color(self.accent_color.as_deref()).unwrap_or(Color::Yellow)
    }

    pub fn selection(&self) -> Color {
        parse_color(self.selection_color.as_deref()).unwrap_or(Color::Green)
    }

    pub fn status_background(&self) -> Color {
        parse_color(self.status_background.as_deref()).unwrap_or(Color::Blue)
    }
}

fn parse_color(value: Option<&str>) -> Option<Color> {
    value.and_then(|v| v.parse::<Color>().ok())
}

impl Config {
    pub async fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, creating new one");
                            let default_config = Self::default();
                            let _ = default_config.save().await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate()?;
                                log::info!(
                                    "Successfully loaded config from: {}",
                                    config_path.display()
                                );
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to backup broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save().await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save().await;
        Ok(default_config)
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_path() {
            let mut config_to_save = self.clone();
            config_to_save.validate()?;

            if let Some(parent) = config_path.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return Err(anyhow::anyhow!(
                        "Failed to create config directory: {} - {}",
                        parent.display(),
                        e
                    ));
                }
            }

            let content = serde_json::to_string_pretty(&config_to_save)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            tokio::fs::write(&config_path, content).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to write config file: {} - {}",
                    config_path.display(),
                    e
                )
            })?;
            log::info!("Successfully saved config to: {}", config_path.display());
        }
        Ok(())
    }

    /// Validate configuration values and fix invalid ones
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        if self.tree.glyph_style == GlyphStyle::Custom && self.tree.custom_glyphs.is_none() {
            log::warn!("Custom glyph style without custom_glyphs, using unicode");
            self.tree.glyph_style = GlyphStyle::Unicode;
            has_issues = true;
        }

        if self.tree.margin.chars().count() > MAX_MARGIN_WIDTH {
            log::warn!("Tree margin too wide: {:?}, clearing", self.tree.margin);
            self.tree.margin.clear();
            has_issues = true;
        }

        if self.export.default_instance.trim().is_empty() {
            log::warn!("Empty default instance name, using default");
            self.export.default_instance = "main".to_string();
            has_issues = true;
        }

        if self.theme.name.is_empty() {
            log::warn!("Empty theme name, using default");
            self.theme.name = "dark".to_string();
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PROVIDER_EXPLORER_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("PROVIDER_EXPLORER_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("io", "terraconstructs", "provider-explorer")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn config_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn set_config_path(path: &std::path::Path) -> (Option<String>, Option<String>) {
        let previous_dir = std::env::var("PROVIDER_EXPLORER_CONFIG_DIR").ok();
        let previous_path = std::env::var("PROVIDER_EXPLORER_CONFIG_PATH").ok();
        std::env::set_var("PROVIDER_EXPLORER_CONFIG_PATH", path);
        std::env::remove_var("PROVIDER_EXPLORER_CONFIG_DIR");
        (previous_dir, previous_path)
    }

    fn restore_config_env(previous: (Option<String>, Option<String>)) {
        match previous.0 {
            Some(value) => std::env::set_var("PROVIDER_EXPLORER_CONFIG_DIR", value),
            None => std::env::remove_var("PROVIDER_EXPLORER_CONFIG_DIR"),
        }

        match previous.1 {
            Some(value) => std::env::set_var("PROVIDER_EXPLORER_CONFIG_PATH", value),
            None => std::env::remove_var("PROVIDER_EXPLORER_CONFIG_PATH"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.tree.glyph_style, GlyphStyle::Unicode);
        assert_eq!(config.tree.glyphs(), Glyphs::default());
        assert_eq!(config.export.default_instance, "main");
        assert_eq!(config.export.output_dir(), PathBuf::from("."));
        assert_eq!(config.theme.name, "dark");
        assert_eq!(config.theme.accent(), Color::Rgb(0xFF, 0xD1, 0x66));
    }

    #[test]
    fn test_glyph_selection() {
        let mut tree = Config::default().tree;
        tree.glyph_style = GlyphStyle::Ascii;
        tree.margin = String::from(" ");
        let glyphs = tree.glyphs();
        assert_eq!(glyphs.fork, "|--");
        assert_eq!(glyphs.margin, " ");
    }

    #[test]
    fn test_validate_repairs_values() {
        let mut config = Config::default();
        config.tree.glyph_style = GlyphStyle::Custom;
        config.tree.margin = "          ".to_string();
        config.export.default_instance = "  ".to_string();
        config.theme.name.clear();

        config.validate().unwrap();
        assert_eq!(config.tree.glyph_style, GlyphStyle::Unicode);
        assert!(config.tree.margin.is_empty());
        assert_eq!(config.export.default_instance, "main");
        assert_eq!(config.theme.name, "dark");
    }

    #[test]
    fn test_unparsable_colour_falls_back() {
        let mut theme = Config::default().theme;
        theme.accent_color = Some("not-a-colour".to_string());
        theme.selection_color = None;
        assert_eq!(theme.accent(), Color::Yellow);
        assert_eq!(theme.selection(), Color::Green);
    }

    #[tokio::test]
    async fn test_config_serialization() {
        let config = Config::default();

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"tree\""));
        assert!(json.contains("\"export\""));
        assert!(json.contains("\"theme\""));

        let config_from_json: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.theme.name, config_from_json.theme.name);
        assert_eq!(
            config.export.default_instance,
            config_from_json.export.default_instance
        );
        assert_eq!(config.tree.glyph_style, config_from_json.tree.glyph_style);
    }

    #[tokio::test]
    async fn test_config_load_creates_default_and_backs_up_broken_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        let previous_env = {
            let _guard = config_test_lock().lock().unwrap();
            set_config_path(&config_file)
        }; // release lock before await

        let config = Config::load().await.unwrap();
        assert_eq!(config.export.default_instance, "main");
        assert!(config_file.exists());

        std::fs::write(&config_file, "{ not json").unwrap();
        let config = Config::load().await.unwrap();
        assert_eq!(config.theme.name, "dark");
        assert!(config_file.with_extension("bak").exists());

        restore_config_env(previous_env);
    }
}
