//! Directory-backed font storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::FontStorage;
use crate::error::{FontError, FontResult};
use crate::font::{is_plain_file_name, FontFile, FontFormat, SourceOrigin};

/// Stores fonts as plain files in one directory
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> FontResult<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(FontError::not_found(name));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FontStorage for DirectoryStorage {
    async fn list(&self) -> FontResult<Vec<FontFile>> {
        if !tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            debug!("Fonts directory {} does not exist", self.root.display());
            return Ok(Vec::new());
        }

        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| FontError::io(&self.root, e))?;

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FontError::io(&self.root, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                warn!("Skipping non UTF-8 file name in {}", self.root.display());
                continue;
            };
            if FontFormat::from_file_name(&name).is_none() {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping '{}': {}", name, e);
                    continue;
                }
            };

            let mut file = FontFile::new(name, metadata.len(), SourceOrigin::Local);
            if let Ok(modified) = metadata.modified() {
                file = file.with_added_at(DateTime::<Utc>::from(modified));
            }
            files.push(file);
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Found {} font files in {}", files.len(), self.root.display());
        Ok(files)
    }

    async fn get(&self, name: &str) -> FontResult<Vec<u8>> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FontError::not_found(name)),
            Err(e) => Err(FontError::io(path, e)),
        }
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> FontResult<FontFile> {
        let path = self.path_for(name)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| FontError::io(&self.root, e))?;

        let size = bytes.len() as u64;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FontError::io(&path, e))?;

        info!("Stored '{}' ({} bytes) in {}", name, size, self.root.display());
        Ok(FontFile::new(name, size, SourceOrigin::Local).with_added_at(Utc::now()))
    }

    async fn delete(&self, name: &str) -> FontResult<()> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted '{}' from {}", name, self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FontError::not_found(name)),
            Err(e) => Err(FontError::io(path, e)),
        }
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
