//! Remote font sources and ordered provider chains
//!
//! A remote source lists font files published somewhere else (a git
//! repository folder) and downloads their bytes. Sources fail transiently;
//! nothing here retries on its own. A fresh user-initiated refresh is the
//! retry.

pub mod chain;
#[cfg(feature = "remote")]
pub mod github;

pub use chain::{CacheProvider, ChainListing, FontProvider, ProviderChain, RemoteProvider, StorageProvider};
#[cfg(feature = "remote")]
pub use github::GithubSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FontError, FontResult};
use crate::font::{FontFile, SourceOrigin};

/// Default GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// A font file published by a remote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFontEntry {
    pub name: String,

    /// Path inside the remote repository
    pub path: String,

    /// Where the raw bytes can be downloaded
    pub download_url: String,

    /// Content hash reported by the remote
    #[serde(default)]
    pub sha: Option<String>,

    #[serde(default)]
    pub size: u64,
}

impl RemoteFontEntry {
    pub fn to_font_file(&self) -> FontFile {
        FontFile::new(self.name.clone(), self.size, SourceOrigin::Remote)
            .with_locator(self.download_url.clone())
    }
}

/// Trait for remote font sources
#[async_trait]
pub trait RemoteFontSource: Send + Sync {
    /// List font files at `git_ref` (branch, tag or commit); `None` uses the configured default
    async fn list(&self, git_ref: Option<&str>) -> FontResult<Vec<RemoteFontEntry>>;

    /// Download the bytes behind a locator returned by `list`
    async fn download(&self, locator: &str) -> FontResult<Vec<u8>>;

    /// Source identifier for logging/debugging
    fn name(&self) -> &'static str;

    /// Look a file up by name and download it
    async fn download_by_name(&self, name: &str, git_ref: Option<&str>) -> FontResult<Vec<u8>> {
        let entries = self.list(git_ref).await?;
        let entry = entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| FontError::not_found(name))?;
        self.download(&entry.download_url).await
    }
}

/// Remote repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Repository owner (user or organization)
    #[serde(default)]
    pub owner: Option<String>,

    /// Repository name
    #[serde(default)]
    pub repo: Option<String>,

    /// Branch used when no ref is requested explicitly
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Folder inside the repository holding the fonts
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            branch: default_branch(),
            directory: default_directory(),
            token_env: default_token_env(),
            api_base: default_api_base(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Owner and repository are both set
    pub fn is_configured(&self) -> bool {
        self.owner.as_deref().is_some_and(|o| !o.is_empty())
            && self.repo.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// Explicit ref wins over the configured branch
    pub fn effective_ref<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|r| !r.is_empty())
            .unwrap_or(self.branch.as_str())
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_directory() -> String {
    "fonts".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Mock source for testing
#[cfg(test)]
pub(crate) struct MockSource {
    pub entries: Vec<RemoteFontEntry>,
    pub fail_listing: bool,
}

#[cfg(test)]
impl MockSource {
    pub(crate) fn with_files(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|n| RemoteFontEntry {
                    name: n.to_string(),
                    path: format!("fonts/{n}"),
                    download_url: format!("mock://{n}"),
                    sha: None,
                    size: n.len() as u64,
                })
                .collect(),
            fail_listing: false,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl RemoteFontSource for MockSource {
    async fn list(&self, _git_ref: Option<&str>) -> FontResult<Vec<RemoteFontEntry>> {
        if self.fail_listing {
            return Err(FontError::unavailable("mock", "listing disabled"));
        }
        Ok(self.entries.clone())
    }

    async fn download(&self, locator: &str) -> FontResult<Vec<u8>> {
        let name = locator
            .strip_prefix("mock://")
            .ok_or_else(|| FontError::not_found(locator))?;
        Ok(name.as_bytes().to_vec())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ref() {
        let config = RemoteConfig::default();
        assert_eq!(config.effective_ref(None), "main");
        assert_eq!(config.effective_ref(Some("")), "main");
        assert_eq!(config.effective_ref(Some("fix-font-display")), "fix-font-display");
    }

    #[test]
    fn test_is_configured() {
        let mut config = RemoteConfig::default();
        assert!(!config.is_configured());
        config.owner = Some("someone".to_string());
        config.repo = Some("fonts".to_string());
        assert!(config.is_configured());
    }

    #[tokio::test]
    async fn test_download_by_name() {
        let source = MockSource::with_files(&["SATO_01.woff2"]);
        let bytes = source.download_by_name("SATO_01.woff2", None).await.unwrap();
        assert_eq!(bytes, b"SATO_01.woff2".to_vec());

        let missing = source.download_by_name("SATO_99.woff2", None).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[test]
    fn test_remote_entry_to_font_file() {
        let source = MockSource::with_files(&["font_6.woff2"]);
        let file = source.entries[0].to_font_file();
        assert_eq!(file.origin, SourceOrigin::Remote);
        assert_eq!(file.locator.as_deref(), Some("mock://font_6.woff2"));
    }
}
