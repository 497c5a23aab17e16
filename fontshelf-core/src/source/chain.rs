//! Ordered provider chains
//!
//! Providers are tried strictly in the order they were added. The first one
//! that answers wins; failures are logged and the next provider is asked.
//! When every provider fails the chain reports an empty listing together
//! with the collected failures rather than an error.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::RemoteFontSource;
use crate::cache::FontCache;
use crate::error::{FontError, FontResult};
use crate::font::{FontFile, LoadedFont, SourceOrigin};
use crate::storage::FontStorage;

/// Anything that can list fonts and hand out their bytes
#[async_trait]
pub trait FontProvider: Send + Sync {
    /// Provider label for logging
    fn name(&self) -> String;

    async fn list(&self) -> FontResult<Vec<FontFile>>;

    async fn fetch(&self, file: &FontFile) -> FontResult<Vec<u8>>;
}

/// Upload storage as a provider
pub struct StorageProvider {
    storage: Arc<dyn FontStorage>,
}

impl StorageProvider {
    pub fn new(storage: Arc<dyn FontStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl FontProvider for StorageProvider {
    fn name(&self) -> String {
        format!("storage:{}", self.storage.name())
    }

    async fn list(&self) -> FontResult<Vec<FontFile>> {
        self.storage.list().await
    }

    async fn fetch(&self, file: &FontFile) -> FontResult<Vec<u8>> {
        self.storage.get(&file.name).await
    }
}

/// Remote source as a provider, optionally feeding the side cache
pub struct RemoteProvider {
    source: Arc<dyn RemoteFontSource>,
    git_ref: Option<String>,
    cache: Option<FontCache>,
}

impl RemoteProvider {
    pub fn new(source: Arc<dyn RemoteFontSource>) -> Self {
        Self {
            source,
            git_ref: None,
            cache: None,
        }
    }

    pub fn with_ref(mut self, git_ref: Option<String>) -> Self {
        self.git_ref = git_ref;
        self
    }

    /// Copy every successful download into `cache` in the background
    pub fn with_cache(mut self, cache: Option<FontCache>) -> Self {
        self.cache = cache;
        self
    }
}

#[async_trait]
impl FontProvider for RemoteProvider {
    fn name(&self) -> String {
        format!("remote:{}", self.source.name())
    }

    async fn list(&self) -> FontResult<Vec<FontFile>> {
        let entries = self.source.list(self.git_ref.as_deref()).await?;
        Ok(entries.iter().map(|e| e.to_font_file()).collect())
    }

    async fn fetch(&self, file: &FontFile) -> FontResult<Vec<u8>> {
        let bytes = match &file.locator {
            Some(locator) if file.origin == SourceOrigin::Remote => {
                self.source.download(locator).await?
            }
            _ => {
                self.source
                    .download_by_name(&file.name, self.git_ref.as_deref())
                    .await?
            }
        };

        if let Some(cache) = &self.cache {
            cache.store_in_background(&file.name, bytes.clone());
        }

        Ok(bytes)
    }
}

/// Side cache as a provider
pub struct CacheProvider {
    cache: FontCache,
}

impl CacheProvider {
    pub fn new(cache: FontCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl FontProvider for CacheProvider {
    fn name(&self) -> String {
        "cache".to_string()
    }

    async fn list(&self) -> FontResult<Vec<FontFile>> {
        let files = self.cache.list().await?;
        if files.is_empty() {
            return Err(FontError::unavailable("cache", "no cached fonts"));
        }
        Ok(files)
    }

    async fn fetch(&self, file: &FontFile) -> FontResult<Vec<u8>> {
        self.cache.get(&file.name).await
    }
}

/// Result of listing through a chain
#[derive(Debug, Default)]
pub struct ChainListing {
    /// Provider that answered, if any
    pub provider: Option<String>,
    pub files: Vec<FontFile>,
    /// Failures from providers tried before the answer (or from all of them)
    pub failures: Vec<(String, FontError)>,
}

impl ChainListing {
    pub fn is_fallback(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Providers tried in order, first success wins
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn FontProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl FontProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn push(&mut self, provider: Arc<dyn FontProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// List through the chain; never fails, an exhausted chain lists nothing
    pub async fn list(&self) -> ChainListing {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let name = provider.name();
            match provider.list().await {
                Ok(files) => {
                    debug!("Listed {} fonts from '{}'", files.len(), name);
                    return ChainListing {
                        provider: Some(name),
                        files,
                        failures,
                    };
                }
                Err(e) => {
                    warn!("Font provider '{}' failed to list: {}", name, e);
                    failures.push((name, e));
                }
            }
        }

        warn!(
            "All {} font providers failed; listing is empty",
            self.providers.len()
        );
        ChainListing {
            provider: None,
            files: Vec::new(),
            failures,
        }
    }

    /// Fetch bytes for a file from the first provider that has them
    pub async fn fetch(&self, file: &FontFile) -> FontResult<LoadedFont> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.fetch(file).await {
                Ok(bytes) => {
                    debug!("Fetched '{}' from '{}'", file.name, provider.name());
                    return Ok(LoadedFont::new(file.clone(), bytes));
                }
                Err(e) => {
                    debug!("Provider '{}' could not fetch '{}': {}", provider.name(), file.name, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) if !e.is_not_found() => e,
            _ => FontError::not_found(&file.name),
        })
    }
}
