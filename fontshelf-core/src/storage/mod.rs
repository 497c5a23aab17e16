//! Upload storage - one capability, several backends
//!
//! Every backend answers the same four calls (`list`, `get`, `put`,
//! `delete`). The backend is picked once at startup from configuration;
//! callers never branch on which one they hold.

mod filesystem;
mod layered;
mod memory;
pub mod upload;

pub use filesystem::DirectoryStorage;
pub use layered::LayeredStorage;
pub use memory::MemoryStorage;
pub use upload::{UploadFile, UploadPolicy};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::FontResult;
use crate::font::FontFile;

/// Trait for font upload storage backends
///
/// Errors distinguish "not found" from every other failure; see
/// [`crate::error::FontError::is_not_found`].
#[async_trait]
pub trait FontStorage: Send + Sync {
    /// List stored font files (metadata only)
    async fn list(&self) -> FontResult<Vec<FontFile>>;

    /// Read the bytes of one stored font
    async fn get(&self, name: &str) -> FontResult<Vec<u8>>;

    /// Store bytes under `name`, replacing an existing file of that name
    async fn put(&self, name: &str, bytes: Vec<u8>) -> FontResult<FontFile>;

    /// Remove a stored font
    async fn delete(&self, name: &str) -> FontResult<()>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Which storage backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Font files in a directory on disk
    #[default]
    Filesystem,
    /// Process-local map; contents vanish on exit
    Memory,
    /// Directory on disk mirrored into memory
    Layered,
}

impl StorageKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "filesystem" | "fs" | "disk" => Some(StorageKind::Filesystem),
            "memory" | "mem" => Some(StorageKind::Memory),
            "layered" => Some(StorageKind::Layered),
            _ => None,
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StorageKind::Filesystem => "filesystem",
            StorageKind::Memory => "memory",
            StorageKind::Layered => "layered",
        };
        f.write_str(label)
    }
}

/// Open the configured backend
pub fn open(kind: StorageKind, fonts_dir: &Path) -> Arc<dyn FontStorage> {
    info!("Opening {} font storage ({})", kind, fonts_dir.display());

    match kind {
        StorageKind::Filesystem => Arc::new(DirectoryStorage::new(fonts_dir)),
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
        StorageKind::Layered => Arc::new(LayeredStorage::new(
            Arc::new(DirectoryStorage::new(fonts_dir)),
            Arc::new(MemoryStorage::new()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!(StorageKind::parse("FS"), Some(StorageKind::Filesystem));
        assert_eq!(StorageKind::parse("memory"), Some(StorageKind::Memory));
        assert_eq!(StorageKind::parse("layered"), Some(StorageKind::Layered));
        assert_eq!(StorageKind::parse("s3"), None);
    }

    #[test]
    fn test_open_picks_backend() {
        let dir = std::path::PathBuf::from("fonts");
        assert_eq!(open(StorageKind::Filesystem, &dir).name(), "filesystem");
        assert_eq!(open(StorageKind::Memory, &dir).name(), "memory");
        assert_eq!(open(StorageKind::Layered, &dir).name(), "layered");
    }
}
