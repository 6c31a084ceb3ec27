use anyhow::Result;
use std::path::Path;
use tokio::fs;

const LARGE_FILE_THRESHOLD: u64 = 64 * 1024 * 1024;
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Writes export files.
#[derive(Debug, Clone, Default)]
pub struct FileManager;

impl FileManager {
    pub fn new() -> Self {
        Self
    }

    /// Writes `content` to `path`, keeping a `.bak` copy of a non-empty
    /// previous file.
    pub async fn write_export(&self, path: &Path, content: &str) -> Result<String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow::anyhow!("Failed to create directory: {} - {}", parent.display(), e)
                })?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        if path.exists() {
            match fs::metadata(path).await {
                Ok(metadata) if metadata.permissions().readonly() => {
                    return Err(anyhow::anyhow!(
                        "Target file is read-only: {}",
                        path.display()
                    ));
                }
                Ok(metadata) if metadata.len() > 0 => {
                    let backup_path = path.with_extension("tf.bak");
                    if let Err(e) = fs::copy(path, &backup_path).await {
                        log::warn!("Failed to create backup: {}", e);
                    } else {
                        log::info!("Created backup: {}", backup_path.display());
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Failed to check target file metadata: {}", e),
            }
        }

        let mut attempts = 0;
        loop {
            match fs::write(path, content.as_bytes()).await {
                Ok(_) => {
                    log::info!("Wrote export to {}", path.display());
                    return Ok(format!(
                        "Wrote {} lines to '{}'",
                        content.lines().count(),
                        path.display()
                    ));
                }
                Err(e) => {
                    attempts += 1;
                    if attempts >= MAX_WRITE_ATTEMPTS {
                        let error_msg = match e.kind() {
                            std::io::ErrorKind::PermissionDenied => {
                                format!("No permission to write: {}", path.display())
                            }
                            std::io::ErrorKind::WriteZero => {
                                format!("Disk may be full: {}", path.display())
                            }
                            _ => format!("Failed to write file: {} - {}", path.display(), e),
                        };
                        return Err(anyhow::anyhow!(error_msg));
                    }

                    tokio::time::sleep(tokio::time::Duration::from_millis(100 * attempts as u64))
                        .await;
                    log::warn!(
                        "Write attempt {} failed for {}, retrying...",
                        attempts,
                        path.display()
                    );
                }
            }
        }
    }
}

/// Reads a schema document with the usual sanity checks.
pub async fn read_schema_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(anyhow::anyhow!("File not found: {}", path.display()));
    }

    if !path.is_file() {
        return Err(anyhow::anyhow!("Not a file: {}", path.display()));
    }

    match fs::metadata(path).await {
        Ok(metadata) if metadata.len() > LARGE_FILE_THRESHOLD => {
            log::warn!(
                "Large schema file ({} bytes): {}",
                metadata.len(),
                path.display()
            );
        }
        Ok(_) => {}
        Err(e) => log::warn!("Failed to get file metadata: {}", e),
    }

    match fs::read_to_string(path).await {
        Ok(content) => {
            if content.contains('\0') {
                return Err(anyhow::anyhow!(
                    "File looks binary, expected JSON: {}",
                    path.display()
                ));
            }
            log::info!("Read schema file: {} ({} bytes)", path.display(), content.len());
            Ok(content)
        }
        Err(e) => {
            let error_msg = match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    format!("No permission to read: {}", path.display())
                }
                std::io::ErrorKind::NotFound => format!("File not found: {}", path.display()),
                std::io::ErrorKind::InvalidData => {
                    format!("File is not valid UTF-8: {}", path.display())
                }
                _ => format!("Failed to read file: {} - {}", path.display(), e),
            };
            Err(anyhow::anyhow!(error_msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_read_schema_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{{\"format_version\": \"1.0\"}}").unwrap();

        let content = read_schema_file(temp_file.path()).await.unwrap();
        assert!(content.contains("format_version"));
    }

    #[tokio::test]
    async fn test_read_rejects_missing_and_binary_files() {
        let dir = TempDir::new().unwrap();
        assert!(read_schema_file(&dir.path().join("missing.json")).await.is_err());
        assert!(read_schema_file(dir.path()).await.is_err());

        let binary = dir.path().join("binary.json");
        std::fs::write(&binary, b"{\0}").unwrap();
        assert!(read_schema_file(&binary).await.is_err());
    }

    #[tokio::test]
    async fn test_write_export_creates_dirs_and_backup() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("aws_instance_variables.tf");
        let fm = FileManager::new();

        let message = fm.write_export(&target, "first\n").await.unwrap();
        assert!(message.starts_with("Wrote 1 lines"));
        assert!(message.contains("aws_instance_variables.tf"));

        fm.write_export(&target, "second\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second\n");
        let backup = target.with_extension("tf.bak");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "first\n");
    }
}
