//! Font library service
//!
//! Ties one upload storage backend to the upload policy and the catalog.
//! Everything user-facing (CLI commands, a web layer) goes through here.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{resolve, Catalog};
use crate::error::{FontError, FontResult};
use crate::font::{FontFile, LoadedFont, SourceOrigin};
use crate::render::RenderTarget;
use crate::storage::{FontStorage, UploadFile, UploadPolicy};

/// Upload storage plus the rules for writing to it
pub struct FontLibrary {
    storage: Arc<dyn FontStorage>,
    policy: UploadPolicy,
}

impl FontLibrary {
    pub fn new(storage: Arc<dyn FontStorage>) -> Self {
        Self::with_policy(storage, UploadPolicy::default())
    }

    pub fn with_policy(storage: Arc<dyn FontStorage>, policy: UploadPolicy) -> Self {
        Self { storage, policy }
    }

    pub fn storage(&self) -> &Arc<dyn FontStorage> {
        &self.storage
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub async fn list(&self) -> FontResult<Vec<FontFile>> {
        self.storage.list().await
    }

    /// Current catalog; an unreachable backend yields an empty one
    pub async fn catalog(&self) -> Catalog {
        match self.storage.list().await {
            Ok(files) => Catalog::build(&files),
            Err(e) => {
                warn!(
                    "Listing from '{}' storage failed, showing an empty catalog: {}",
                    self.storage.name(),
                    e
                );
                Catalog::new()
            }
        }
    }

    /// Validate the whole batch, then store every file
    pub async fn upload(&self, files: Vec<UploadFile>) -> FontResult<Vec<FontFile>> {
        self.policy.validate_batch(&files)?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let saved = self.storage.put(&file.name, file.bytes).await?;
            info!("Uploaded '{}' ({} bytes)", saved.name, saved.size_bytes);
            stored.push(saved);
        }
        Ok(stored)
    }

    /// Load one stored font with its bytes
    pub async fn get(&self, name: &str) -> FontResult<LoadedFont> {
        let bytes = self.storage.get(name).await?;
        let file = self
            .storage
            .list()
            .await
            .ok()
            .and_then(|files| files.into_iter().find(|f| f.name == name))
            .unwrap_or_else(|| FontFile::new(name, bytes.len() as u64, SourceOrigin::Local));
        Ok(LoadedFont::new(file, bytes))
    }

    pub async fn delete(&self, name: &str) -> FontResult<()> {
        self.storage.delete(name).await?;
        info!("Deleted '{}'", name);
        Ok(())
    }

    /// Resolve a selection and load the chosen file
    pub async fn load_selection(
        &self,
        catalog: &Catalog,
        base_name: &str,
        variant: Option<&str>,
    ) -> FontResult<LoadedFont> {
        let file = resolve(catalog, base_name, variant)
            .file()
            .cloned()
            .ok_or_else(|| match variant {
                Some(v) => FontError::not_found(format!("{base_name}_{v}")),
                None => FontError::not_found(base_name),
            })?;
        let bytes = self.storage.get(&file.name).await?;
        Ok(LoadedFont::new(file, bytes))
    }

    /// Register every catalog file with a render target, concurrently.
    /// Returns how many registrations succeeded; failures are logged.
    pub async fn register_catalog(&self, catalog: &Catalog, target: &dyn RenderTarget) -> usize {
        let registrations = catalog.files().iter().filter_map(|entry| {
            let format = entry.file.format()?;
            let name = entry.file.name.clone();
            let family = entry.file.stem().to_string();
            Some(async move {
                let bytes = self.storage.get(&name).await?;
                target.register_font(&family, bytes, format).await?;
                Ok::<_, FontError>(name)
            })
        });

        let results = join_all(registrations).await;
        let mut registered = 0;
        for result in results {
            match result {
                Ok(name) => {
                    debug!("Registered '{}' with {}", name, target.name());
                    registered += 1;
                }
                Err(e) => warn!("Font registration failed: {}", e),
            }
        }

        if let Err(e) = target.fonts_ready().await {
            warn!("Render target never reported fonts ready: {}", e);
        }
        registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CssRenderTarget;
    use crate::storage::MemoryStorage;
    use tempfile::TempDir;

    fn library() -> FontLibrary {
        FontLibrary::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_upload_and_catalog() {
        let library = library();
        let stored = library
            .upload(vec![
                UploadFile::new("SATO_01.ttf", vec![1]),
                UploadFile::new("SATO_02.ttf", vec![2, 2]),
            ])
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);

        let catalog = library.catalog().await;
        assert_eq!(catalog.numbers_for("SATO"), vec![Some("01"), Some("02")]);
    }

    #[tokio::test]
    async fn test_rejected_batch_writes_nothing() {
        let library = library();
        let err = library
            .upload(vec![
                UploadFile::new("SATO_01.ttf", vec![1]),
                UploadFile::new("logo.png", vec![1]),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, FontError::MalformedUpload { .. }));
        assert!(library.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_selection() {
        let library = library();
        library
            .upload(vec![UploadFile::new("SATO_02.woff2", vec![7])])
            .await
            .unwrap();
        let catalog = library.catalog().await;

        let loaded = library.load_selection(&catalog, "SATO", Some("02")).await.unwrap();
        assert_eq!(loaded.bytes, vec![7]);

        let missing = library.load_selection(&catalog, "SATO", Some("99")).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let library = library();
        library
            .upload(vec![UploadFile::new("font_6.otf", vec![6, 6])])
            .await
            .unwrap();

        let loaded = library.get("font_6.otf").await.unwrap();
        assert_eq!(loaded.file.size_bytes, 2);

        library.delete("font_6.otf").await.unwrap();
        assert!(library.get("font_6.otf").await.unwrap_err().is_not_found());
        assert!(library.delete("font_6.otf").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_register_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let library = library();
        library
            .upload(vec![
                UploadFile::new("SATO_01.ttf", vec![1]),
                UploadFile::new("YAMADA_01.woff", vec![2]),
            ])
            .await
            .unwrap();

        let target = CssRenderTarget::new(temp_dir.path(), "fonts/");
        let catalog = library.catalog().await;
        assert_eq!(library.register_catalog(&catalog, &target).await, 2);

        let css = target.stylesheet().await;
        assert!(css.contains("font-family: 'SATO_01';"));
        assert!(css.contains("format('woff')"));
    }
}
