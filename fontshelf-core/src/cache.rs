//! On-device side cache of fetched font bytes
//!
//! A missing, stale or corrupt entry reads as "not cached". Background
//! writes log their failures instead of returning them, and the primary
//! source never waits on the cache.
//!
//! Layout, one pair of files per font:
//!
//! ```text
//! <cache dir>/
//! ├── SATO_01.woff2        # raw bytes
//! └── SATO_01.woff2.json   # CachedFont metadata (size, sha256, cached_at)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FontError, FontResult};
use crate::font::{is_plain_file_name, FontFile, FontFormat, SourceOrigin};

/// Default time-to-live for cached fonts (7 days)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const METADATA_SUFFIX: &str = ".json";

/// Cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Cache directory; platform cache dir when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Entries older than this are ignored
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            directory: None,
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_hours() -> u64 {
    DEFAULT_CACHE_TTL.as_secs() / 3600
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }

    /// Resolve the cache directory, falling back to the platform default
    pub fn resolve_directory(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(default_cache_dir)
    }
}

/// Platform cache directory for fontshelf
pub fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "fontshelf", "fontshelf")
        .map(|dirs| dirs.cache_dir().join("fonts"))
        .or_else(|| dirs::cache_dir().map(|d| d.join("fontshelf").join("fonts")))
}

/// Metadata stored next to each cached font
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFont {
    pub name: String,
    pub size: u64,
    /// Hex SHA-256 of the cached bytes
    pub sha256: String,
    pub cached_at: DateTime<Utc>,
}

/// Directory-backed cache of font bytes
#[derive(Debug, Clone)]
pub struct FontCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FontCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_ttl(dir, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Open the cache described by configuration; `None` when disabled
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        config
            .resolve_directory()
            .map(|dir| Self::with_ttl(dir, config.ttl()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn bytes_path(&self, name: &str) -> FontResult<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(FontError::not_found(name));
        }
        Ok(self.dir.join(name))
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{METADATA_SUFFIX}"))
    }

    fn is_fresh(&self, cached: &CachedFont) -> bool {
        let age = Utc::now()
            .signed_duration_since(cached.cached_at)
            .to_std()
            .unwrap_or_default();
        age <= self.ttl
    }

    async fn read_metadata(&self, name: &str) -> Option<CachedFont> {
        if !is_plain_file_name(name) {
            return None;
        }
        let path = self.metadata_path(name);
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str::<CachedFont>(&content) {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!("Ignoring corrupt cache metadata {}: {}", path.display(), e);
                None
            }
        }
    }

    /// List fresh cached fonts
    pub async fn list(&self) -> FontResult<Vec<FontFile>> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FontError::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FontError::io(&self.dir, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if FontFormat::from_file_name(&name).is_none() {
                continue;
            }
            let Some(cached) = self.read_metadata(&name).await else {
                continue;
            };
            if !self.is_fresh(&cached) {
                debug!("Cache entry '{}' is stale", name);
                continue;
            }
            files.push(
                FontFile::new(name, cached.size, SourceOrigin::Cache)
                    .with_added_at(cached.cached_at),
            );
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Read cached bytes; stale or corrupt entries are reported as not found
    pub async fn get(&self, name: &str) -> FontResult<Vec<u8>> {
        let path = self.bytes_path(name)?;
        let cached = self
            .read_metadata(name)
            .await
            .ok_or_else(|| FontError::not_found(name))?;

        if !self.is_fresh(&cached) {
            return Err(FontError::not_found(name));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|_| FontError::not_found(name))?;

        if digest(&bytes) != cached.sha256 {
            warn!("Cache entry '{}' failed digest check", name);
            return Err(FontError::not_found(name));
        }

        Ok(bytes)
    }

    /// Write bytes and metadata into the cache
    pub async fn store(&self, name: &str, bytes: &[u8]) -> FontResult<()> {
        let path = self.bytes_path(name)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FontError::io(&self.dir, e))?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FontError::io(&path, e))?;

        let cached = CachedFont {
            name: name.to_string(),
            size: bytes.len() as u64,
            sha256: digest(bytes),
            cached_at: Utc::now(),
        };
        let metadata_path = self.metadata_path(name);
        let content = serde_json::to_string_pretty(&cached)
            .map_err(|source| FontError::Serialization { source })?;
        tokio::fs::write(&metadata_path, content)
            .await
            .map_err(|e| FontError::io(&metadata_path, e))?;

        debug!("Cached '{}' ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Fire-and-forget write; failures are logged and dropped
    pub fn store_in_background(&self, name: &str, bytes: Vec<u8>) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            if let Err(e) = cache.store(&name, &bytes).await {
                warn!("Failed to cache '{}': {}", name, e);
            }
        })
    }

    /// Remove one entry; missing entries are fine
    pub async fn evict(&self, name: &str) -> FontResult<()> {
        let path = self.bytes_path(name)?;
        let metadata_path = self.metadata_path(name);
        for p in [path, metadata_path] {
            match tokio::fs::remove_file(&p).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(FontError::io(p, e)),
            }
        }
        Ok(())
    }

    /// Remove every cached font
    pub async fn clear(&self) -> FontResult<usize> {
        let mut removed = 0;
        for file in self.list_all_names().await? {
            self.evict(&file).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn list_all_names(&self) -> FontResult<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FontError::io(&self.dir, e)),
        };
        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FontError::io(&self.dir, e))?
        {
            if let Ok(name) = entry.file_name().into_string() {
                if FontFormat::from_file_name(&name).is_some() {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
