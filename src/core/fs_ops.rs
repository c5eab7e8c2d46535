// src/core/fs_ops.rs
//! File system helpers with error context

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            debug!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Read a file, returning `None` when it does not exist
    pub async fn read_file_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read file: {}", path.display()))
            }
        }
    }

    /// Write a file, creating parent directories as needed
    pub async fn write_file_safe(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        debug!("Written file: {}", path.display());
        Ok(())
    }

    /// Resolve `relative` against `base` unless it is already absolute
    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    /// Sibling path of `file` with the given name, e.g. `order.yaml` next to the resume
    pub fn sibling(file: &Path, name: &str) -> PathBuf {
        match file.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }
}
