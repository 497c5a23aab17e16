//! GitHub repository font source
//!
//! Lists a repository folder through the contents API and downloads the
//! raw files it points at. Only plain files with font extensions are kept.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{RemoteConfig, RemoteFontEntry, RemoteFontSource};
use crate::error::{FontError, FontResult};
use crate::font::FontFormat;

/// Contents API item (subset of the fields GitHub returns)
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    size: u64,
}

/// Font source backed by a GitHub repository folder
pub struct GithubSource {
    client: reqwest::Client,
    config: RemoteConfig,
    token: Option<String>,
}

impl GithubSource {
    /// Create a source; the token is read from `config.token_env` when set
    pub fn new(config: RemoteConfig) -> FontResult<Self> {
        if !config.is_configured() {
            return Err(FontError::unavailable(
                "github",
                "repository owner and name are not configured",
            ));
        }

        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_none() {
            debug!(
                "{} is not set; using unauthenticated GitHub requests",
                config.token_env
            );
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("fontshelf/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FontError::unavailable("github", e))?;

        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Contents API URL for the configured folder
    pub fn contents_url(&self) -> String {
        contents_url(&self.config)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn contents_url(config: &RemoteConfig) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        config.api_base.trim_end_matches('/'),
        config.owner.as_deref().unwrap_or_default(),
        config.repo.as_deref().unwrap_or_default(),
        config.directory.trim_matches('/'),
    )
}

/// Keep plain font files from a contents listing
fn font_entries(items: Vec<ContentItem>) -> Vec<RemoteFontEntry> {
    items
        .into_iter()
        .filter(|item| item.kind == "file" && FontFormat::from_file_name(&item.name).is_some())
        .filter_map(|item| match item.download_url {
            Some(download_url) => Some(RemoteFontEntry {
                name: item.name,
                path: item.path,
                download_url,
                sha: item.sha,
                size: item.size,
            }),
            None => {
                warn!("Skipping '{}': no download URL", item.name);
                None
            }
        })
        .collect()
}

/// Parse a contents API body; a non-array body (a single file) lists nothing
fn parse_listing(body: &str) -> FontResult<Vec<RemoteFontEntry>> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|source| FontError::Serialization { source })?;

    if !value.is_array() {
        return Ok(Vec::new());
    }

    let items: Vec<ContentItem> =
        serde_json::from_value(value).map_err(|source| FontError::Serialization { source })?;
    Ok(font_entries(items))
}

#[async_trait]
impl RemoteFontSource for GithubSource {
    async fn list(&self, git_ref: Option<&str>) -> FontResult<Vec<RemoteFontEntry>> {
        let git_ref = self.config.effective_ref(git_ref);
        let url = self.contents_url();

        info!(
            "Listing fonts from {}/{}@{}/{}",
            self.config.owner.as_deref().unwrap_or_default(),
            self.config.repo.as_deref().unwrap_or_default(),
            git_ref,
            self.config.directory
        );

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("ref", git_ref)])
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| FontError::unavailable("github", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FontError::unavailable("github", e))?;

        if !status.is_success() {
            return Err(FontError::Remote {
                status: status.as_u16(),
                message: format!("listing {url} failed: {body}"),
            });
        }

        let entries = parse_listing(&body)?;
        debug!("GitHub listing returned {} font files", entries.len());
        Ok(entries)
    }

    async fn download(&self, locator: &str) -> FontResult<Vec<u8>> {
        debug!("Downloading font from {}", locator);

        let response = self
            .authorized(self.client.get(locator))
            .send()
            .await
            .map_err(|e| FontError::unavailable("github", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FontError::not_found(locator));
        }
        if !status.is_success() {
            return Err(FontError::Remote {
                status: status.as_u16(),
                message: format!("download of {locator} failed"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FontError::unavailable("github", e))?;

        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> RemoteConfig {
        RemoteConfig {
            owner: Some("type-studio".to_string()),
            repo: Some("handwriting".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_contents_url() {
        let mut config = configured();
        config.api_base = "https://api.github.com/".to_string();
        config.directory = "/fonts/".to_string();
        assert_eq!(
            contents_url(&config),
            "https://api.github.com/repos/type-studio/handwriting/contents/fonts"
        );
    }

    #[test]
    fn test_unconfigured_source_is_unavailable() {
        let err = GithubSource::new(RemoteConfig::default()).err().unwrap();
        assert!(matches!(err, FontError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_source_builds_when_configured() {
        let source = GithubSource::new(configured()).unwrap();
        assert!(source.contents_url().ends_with("/contents/fonts"));
    }

    #[test]
    fn test_parse_listing_filters_entries() {
        let body = r#"[
            {"name": "SATO_01.woff2", "path": "fonts/SATO_01.woff2", "type": "file",
             "download_url": "https://raw.example/SATO_01.woff2", "sha": "abc", "size": 1200},
            {"name": "README.md", "path": "fonts/README.md", "type": "file",
             "download_url": "https://raw.example/README.md", "sha": "def", "size": 10},
            {"name": "old.ttf", "path": "fonts/old.ttf", "type": "dir",
             "download_url": null, "sha": "ghi", "size": 0},
            {"name": "YAMADA_02.TTF", "path": "fonts/YAMADA_02.TTF", "type": "file",
             "download_url": "https://raw.example/YAMADA_02.TTF", "size": 900}
        ]"#;

        let entries = parse_listing(body).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["SATO_01.woff2", "YAMADA_02.TTF"]);
        assert_eq!(entries[0].sha.as_deref(), Some("abc"));
        assert_eq!(entries[1].size, 900);
    }

    #[test]
    fn test_parse_listing_single_file_body() {
        let body = r#"{"name": "SATO_01.woff2", "path": "fonts/SATO_01.woff2", "type": "file"}"#;
        assert!(parse_listing(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        assert!(matches!(
            parse_listing("not json"),
            Err(FontError::Serialization { .. })
        ));
    }
}
