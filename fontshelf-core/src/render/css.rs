//! Stylesheet render target
//!
//! Writes registered font bytes into an asset directory and produces the
//! matching `@font-face` rules plus the inline preview style. Registering a
//! family again replaces its rule.

use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use super::{css_string, RenderTarget, StyleDeclaration};
use crate::error::{FontError, FontResult};
use crate::font::{is_plain_file_name, FontFormat};

/// One `@font-face` rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceRule {
    pub family: String,
    /// File name the `src` URL points at
    pub file_name: String,
    pub format: FontFormat,
}

impl FontFaceRule {
    pub fn new(family: impl Into<String>, format: FontFormat) -> Self {
        let family = family.into();
        let file_name = format!("{}{}", family, format.extension());
        Self {
            family,
            file_name,
            format,
        }
    }

    /// Render the rule with `url_prefix` in front of the file name
    pub fn to_css(&self, url_prefix: &str) -> String {
        format!(
            "@font-face {{\n    font-family: {};\n    src: url({}) format('{}');\n    font-weight: normal;\n    font-style: normal;\n}}\n",
            css_string(&self.family, '\''),
            css_string(&format!("{}{}", url_prefix, self.file_name), '\''),
            self.format.css_format()
        )
    }
}

/// Decrements the pending counter when a registration ends, successful or not
struct PendingGuard<'a> {
    pending: &'a watch::Sender<usize>,
}

impl<'a> PendingGuard<'a> {
    fn start(pending: &'a watch::Sender<usize>) -> Self {
        pending.send_modify(|n| *n += 1);
        Self { pending }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Render target producing a stylesheet and font assets on disk
pub struct CssRenderTarget {
    asset_dir: PathBuf,
    url_prefix: String,
    rules: RwLock<Vec<FontFaceRule>>,
    style: RwLock<Option<StyleDeclaration>>,
    pending: watch::Sender<usize>,
}

impl CssRenderTarget {
    /// Fonts are written to `asset_dir` and referenced as `{url_prefix}{file}`
    pub fn new(asset_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            asset_dir: asset_dir.into(),
            url_prefix: url_prefix.into(),
            rules: RwLock::new(Vec::new()),
            style: RwLock::new(None),
            pending,
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Registrations still in flight
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    pub async fn rules(&self) -> Vec<FontFaceRule> {
        self.rules.read().await.clone()
    }

    pub async fn current_style(&self) -> Option<StyleDeclaration> {
        self.style.read().await.clone()
    }

    /// Full stylesheet: every `@font-face` rule, then the preview rule
    pub async fn stylesheet(&self) -> String {
        let mut css = String::new();
        for rule in self.rules.read().await.iter() {
            css.push_str(&rule.to_css(&self.url_prefix));
        }

        if let Some(style) = self.style.read().await.as_ref() {
            let _ = writeln!(css, ".preview-text {{ {} }}", style.to_css());
        }
        css
    }

    /// Write the stylesheet to `path`
    pub async fn write_stylesheet(&self, path: &Path) -> FontResult<()> {
        let css = self.stylesheet().await;
        tokio::fs::write(path, css)
            .await
            .map_err(|e| FontError::io(path, e))?;
        info!("Wrote stylesheet to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl RenderTarget for CssRenderTarget {
    async fn register_font(
        &self,
        family: &str,
        bytes: Vec<u8>,
        format: FontFormat,
    ) -> FontResult<()> {
        let _guard = PendingGuard::start(&self.pending);

        let rule = FontFaceRule::new(family, format);
        if !is_plain_file_name(&rule.file_name) {
            return Err(FontError::malformed(family, "font family is not a plain file name"));
        }

        tokio::fs::create_dir_all(&self.asset_dir)
            .await
            .map_err(|e| FontError::io(&self.asset_dir, e))?;
        let path = self.asset_dir.join(&rule.file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| FontError::io(&path, e))?;

        let mut rules = self.rules.write().await;
        rules.retain(|r| r.family != rule.family);
        rules.push(rule);
        debug!("Registered font family '{}' ({} bytes)", family, bytes.len());
        Ok(())
    }

    async fn apply_style(&self, style: &StyleDeclaration) -> FontResult<()> {
        *self.style.write().await = Some(style.clone());
        Ok(())
    }

    async fn fonts_ready(&self) -> FontResult<()> {
        let mut rx = self.pending.subscribe();
        rx.wait_for(|pending| *pending == 0)
            .await
            .map_err(|e| FontError::unavailable("css", e))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "css"
    }
}
