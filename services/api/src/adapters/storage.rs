//! services/api/src/adapters/storage.rs
//!
//! A `FileStorageService` that keeps lesson materials on the local filesystem,
//! one file per storage key, rooted at `STORAGE_ROOT`.

use async_trait::async_trait;
use bytes::Bytes;
use didactic_core::ports::{FileStorageService, PortError, PortResult};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct LocalStorageAdapter {
    root: PathBuf,
}

impl LocalStorageAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a storage key onto a path under the root. Keys that would escape the
    /// root (absolute paths, `..`, empty segments) are rejected.
    fn resolve(&self, key: &str) -> PortResult<PathBuf> {
        if key.is_empty()
            || key
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(PortError::InvalidInput(format!("Invalid storage path '{}'", key)));
        }
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(PortError::InvalidInput(format!("Invalid storage path '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorageService for LocalStorageAdapter {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> PortResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    PortError::InvalidInput(format!("The resource already exists: {}", path))
                }
                _ => PortError::Unexpected(e.to_string()),
            })?;
        write_or_discard(&target, &mut file, &data).await?;

        debug!("Stored {} bytes ({}) at {}", data.len(), content_type, path);
        Ok(())
    }
}

/// Writes the whole blob. On failure the partial file is removed so the key
/// can be uploaded again.
async fn write_or_discard<W>(target: &Path, file: &mut W, data: &[u8]) -> PortResult<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(target).await {
            warn!(
                "Failed to remove partial upload {}: {}",
                target.display(),
                cleanup
            );
        }
        return Err(PortError::Unexpected(e.to_string()));
    }
    Ok(())
}
