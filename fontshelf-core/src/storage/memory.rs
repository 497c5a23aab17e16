//! In-memory font storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::FontStorage;
use crate::error::{FontError, FontResult};
use crate::font::{FontFile, SourceOrigin};

#[derive(Debug, Clone)]
struct StoredFont {
    bytes: Vec<u8>,
    added_at: DateTime<Utc>,
}

/// Process-local font storage keyed by file name
#[derive(Debug, Default)]
pub struct MemoryStorage {
    fonts: RwLock<BTreeMap<String, StoredFont>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.fonts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.fonts.read().await.is_empty()
    }
}

#[async_trait]
impl FontStorage for MemoryStorage {
    async fn list(&self) -> FontResult<Vec<FontFile>> {
        let fonts = self.fonts.read().await;
        Ok(fonts
            .iter()
            .map(|(name, stored)| {
                FontFile::new(name.clone(), stored.bytes.len() as u64, SourceOrigin::Local)
                    .with_added_at(stored.added_at)
            })
            .collect())
    }

    async fn get(&self, name: &str) -> FontResult<Vec<u8>> {
        self.fonts
            .read()
            .await
            .get(name)
            .map(|stored| stored.bytes.clone())
            .ok_or_else(|| FontError::not_found(name))
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> FontResult<FontFile> {
        let added_at = Utc::now();
        let size = bytes.len() as u64;

        self.fonts
            .write()
            .await
            .insert(name.to_string(), StoredFont { bytes, added_at });

        debug!("Kept '{}' in memory ({} bytes)", name, size);
        Ok(FontFile::new(name, size, SourceOrigin::Local).with_added_at(added_at))
    }

    async fn delete(&self, name: &str) -> FontResult<()> {
        match self.fonts.write().await.remove(name) {
            Some(_) => Ok(()),
            None => Err(FontError::not_found(name)),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
