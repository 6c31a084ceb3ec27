//! Background loading of the provider schema document.
//!
//! The file is read and decoded on a tokio task; the UI loop only ever sees
//! the finished result, delivered once over a channel.

use anyhow::{Context, Result};
use schematree::ProviderSchemas;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::file_manager;

#[derive(Debug)]
pub enum SchemaEvent {
    Loaded {
        path: PathBuf,
        schemas: ProviderSchemas,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

pub async fn load_schemas(path: &Path) -> Result<ProviderSchemas> {
    let content = file_manager::read_schema_file(path).await?;
    let schemas = ProviderSchemas::from_json(&content)
        .with_context(|| format!("Invalid provider schema JSON in {}", path.display()))?;
    log::info!(
        "Decoded schema document (format {}) with {} providers",
        if schemas.format_version.is_empty() {
            "unknown"
        } else {
            schemas.format_version.as_str()
        },
        schemas.provider_schemas.len()
    );
    Ok(schemas)
}

pub fn spawn_load(path: PathBuf, tx: UnboundedSender<SchemaEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let event = match load_schemas(&path).await {
            Ok(schemas) => SchemaEvent::Loaded { path, schemas },
            Err(e) => {
                log::error!("Failed to load schema '{}': {:#}", path.display(), e);
                SchemaEvent::Failed {
                    path,
                    error: format!("{:#}", e),
                }
            }
        };
        if tx.send(event).is_err() {
            log::warn!("Schema event dropped, UI loop already gone");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_spawn_load_delivers_one_event() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(
            &path,
            r#"{"format_version":"1.0","provider_schemas":{"registry.terraform.io/hashicorp/null":{"resource_schemas":{"null_resource":{"block":{}}}}}}"#,
        )
        .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_load(path.clone(), tx).await.unwrap();

        match rx.recv().await {
            Some(SchemaEvent::Loaded { path: loaded, schemas }) => {
                assert_eq!(loaded, path);
                assert_eq!(schemas.provider_schemas.len(), 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_reports_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "{ \"provider_schemas\": [] }").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_load(path, tx).await.unwrap();

        match rx.recv().await {
            Some(SchemaEvent::Failed { error, .. }) => {
                assert!(error.contains("Invalid provider schema JSON"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
