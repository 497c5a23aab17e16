//! Layered configuration
//!
//! Resolution order (first file found wins, then environment overrides):
//! 1. Explicit `--config` path
//! 2. Project `.fontshelf/config.yaml`
//! 3. Global `<config dir>/fontshelf/config.yaml`
//! 4. Built-in defaults
//!
//! `.json` files are parsed as JSON, everything else as YAML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use crate::cache::CacheConfig;
use crate::source::RemoteConfig;
use crate::storage::{StorageKind, UploadPolicy};

/// Project-local config location, relative to the working directory
pub const PROJECT_CONFIG: &str = ".fontshelf/config.yaml";

/// Environment variables that override file settings
pub const ENV_GITHUB_OWNER: &str = "GITHUB_OWNER";
pub const ENV_GITHUB_REPO: &str = "GITHUB_REPO";
pub const ENV_GITHUB_BRANCH: &str = "GITHUB_BRANCH";
pub const ENV_FONTS_DIR: &str = "FONTSHELF_FONTS_DIR";

/// Top-level fontshelf settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfConfig {
    /// Upload storage backend
    #[serde(default)]
    pub storage: StorageKind,

    /// Directory holding uploaded fonts
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,

    #[serde(default)]
    pub upload: UploadPolicy,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            fonts_dir: default_fonts_dir(),
            upload: UploadPolicy::default(),
            remote: RemoteConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}

impl ShelfConfig {
    /// Load configuration using the standard search order and the process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let project = std::env::current_dir()
            .map(|dir| dir.join(PROJECT_CONFIG))
            .ok();
        let mut config = Self::load_from(explicit, project.as_deref(), global_config_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the first existing candidate; no environment involved
    pub fn load_from(
        explicit: Option<&Path>,
        project: Option<&Path>,
        global: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Using configuration from {}", path.display());
            return Self::from_file(path);
        }

        let candidates = project
            .map(Path::to_path_buf)
            .into_iter()
            .chain(global);

        for candidate in candidates {
            trace!("Checking for configuration at {}", candidate.display());
            if candidate.is_file() {
                debug!("Found configuration at {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Parse one config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(owner) = get(ENV_GITHUB_OWNER) {
            debug!("{} overrides remote owner", ENV_GITHUB_OWNER);
            self.remote.owner = Some(owner);
        }
        if let Some(repo) = get(ENV_GITHUB_REPO) {
            debug!("{} overrides remote repo", ENV_GITHUB_REPO);
            self.remote.repo = Some(repo);
        }
        if let Some(branch) = get(ENV_GITHUB_BRANCH) {
            debug!("{} overrides remote branch", ENV_GITHUB_BRANCH);
            self.remote.branch = branch;
        }
        if let Some(dir) = get(ENV_FONTS_DIR) {
            debug!("{} overrides fonts directory", ENV_FONTS_DIR);
            self.fonts_dir = PathBuf::from(dir);
        }
    }
}

/// Global config file: `<platform config dir>/fontshelf/config.yaml`
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "fontshelf", "fontshelf")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .or_else(|| dirs::config_dir().map(|d| d.join("fontshelf").join("config.yaml")))
}
