//! Primary storage mirrored into a secondary store
//!
//! Used where the primary (a scratch directory on a serverless host) may
//! disappear between requests: every upload is also kept in the mirror,
//! reads fall back to the mirror, and listings merge both with the primary
//! shadowing mirror entries of the same name.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::FontStorage;
use crate::catalog::merge_listings;
use crate::error::{FontError, FontResult};
use crate::font::FontFile;

pub struct LayeredStorage {
    primary: Arc<dyn FontStorage>,
    mirror: Arc<dyn FontStorage>,
}

impl LayeredStorage {
    pub fn new(primary: Arc<dyn FontStorage>, mirror: Arc<dyn FontStorage>) -> Self {
        Self { primary, mirror }
    }
}

#[async_trait]
impl FontStorage for LayeredStorage {
    async fn list(&self) -> FontResult<Vec<FontFile>> {
        let primary = self.primary.list().await;
        let mirror = self.mirror.list().await;

        match (primary, mirror) {
            (Ok(p), Ok(m)) => Ok(merge_listings([p, m])),
            (Ok(p), Err(e)) => {
                warn!("Mirror storage '{}' listing failed: {}", self.mirror.name(), e);
                Ok(p)
            }
            (Err(e), Ok(m)) => {
                warn!(
                    "Primary storage '{}' listing failed: {}",
                    self.primary.name(),
                    e
                );
                Ok(m)
            }
            (Err(primary_err), Err(mirror_err)) => Err(FontError::unavailable(
                self.name(),
                format!("primary: {primary_err}; mirror: {mirror_err}"),
            )),
        }
    }

    async fn get(&self, name: &str) -> FontResult<Vec<u8>> {
        match self.primary.get(name).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                if !e.is_not_found() {
                    warn!("Primary read of '{}' failed, trying mirror: {}", name, e);
                }
                self.mirror.get(name).await
            }
        }
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> FontResult<FontFile> {
        let stored = self.primary.put(name, bytes.clone()).await?;

        // Mirror write failures are logged only
        if let Err(e) = self.mirror.put(name, bytes).await {
            warn!("Failed to mirror '{}' into '{}': {}", name, self.mirror.name(), e);
        } else {
            debug!("Mirrored '{}' into '{}'", name, self.mirror.name());
        }

        Ok(stored)
    }

    async fn delete(&self, name: &str) -> FontResult<()> {
        let primary = self.primary.delete(name).await;
        let mirror = self.mirror.delete(name).await;

        // A layer failing with anything but NotFound still holds the file
        match (primary, mirror) {
            (Err(p), _) if !p.is_not_found() => Err(p),
            (_, Err(m)) if !m.is_not_found() => Err(m),
            (Ok(()), _) | (_, Ok(())) => Ok(()),
            (Err(_), Err(_)) => Err(FontError::not_found(name)),
        }
    }

    fn name(&self) -> &'static str {
        "layered"
    }
}
