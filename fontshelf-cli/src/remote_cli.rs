//! Remote repository commands
//!
//! Lists and downloads fonts published in a GitHub repository folder.
//! Listings and downloads go through a provider chain (remote, then the
//! local side cache) so an unreachable remote still shows cached fonts.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::Tabled;
use tracing::{info, warn};

use fontshelf_core::cache::FontCache;
use fontshelf_core::catalog::Catalog;
use fontshelf_core::config::ShelfConfig;
use fontshelf_core::font::{FontFile, SourceOrigin};
use fontshelf_core::source::{
    CacheProvider, ChainListing, GithubSource, ProviderChain, RemoteFontSource, RemoteProvider,
};

use crate::{human_size, print_catalog, print_table};

#[derive(Subcommand, Debug)]
pub enum RemoteCommand {
    /// List fonts in the remote repository
    List {
        /// Branch, tag or commit (defaults to the configured branch)
        #[clap(long)]
        branch: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Download one remote font
    Fetch {
        /// File name in the remote folder
        name: String,

        /// Branch, tag or commit (defaults to the configured branch)
        #[clap(long)]
        branch: Option<String>,

        /// Output path (defaults to the file name in the current directory)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the catalog built from the remote listing
    Catalog {
        /// Branch, tag or commit (defaults to the configured branch)
        #[clap(long)]
        branch: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl RemoteCommand {
    pub async fn execute(self, config: &ShelfConfig) -> Result<()> {
        match self {
            RemoteCommand::List { branch, json } => execute_list(config, branch, json).await,
            RemoteCommand::Fetch {
                name,
                branch,
                output,
            } => execute_fetch(config, &name, branch, output).await,
            RemoteCommand::Catalog { branch, json } => {
                execute_catalog(config, branch, json).await
            }
        }
    }
}

/// Remote first, then the side cache when enabled.
///
/// Downloads are cached by the caller; a background write would not outlive
/// the command.
fn build_chain(
    config: &ShelfConfig,
    branch: Option<String>,
) -> Result<(ProviderChain, Option<FontCache>)> {
    let cache = FontCache::from_config(&config.cache);
    let mut chain = ProviderChain::new();

    match GithubSource::new(config.remote.clone()) {
        Ok(source) => {
            let source: Arc<dyn RemoteFontSource> = Arc::new(source);
            chain.push(Arc::new(RemoteProvider::new(source).with_ref(branch)));
        }
        Err(e) => warn!("Remote source disabled: {}", e),
    }

    if let Some(cache) = &cache {
        chain.push(Arc::new(CacheProvider::new(cache.clone())));
    }

    if chain.is_empty() {
        bail!(
            "No remote source configured. Set remote.owner and remote.repo in the config file \
             or GITHUB_OWNER and GITHUB_REPO in the environment."
        );
    }
    Ok((chain, cache))
}

fn report_fallback(listing: &ChainListing) {
    for (provider, error) in &listing.failures {
        eprintln!("warning: {provider} unavailable: {error}");
    }
    if listing.provider.is_none() {
        eprintln!("warning: no font source answered; showing an empty list");
    }
}

/// Table row for remote fonts
#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Source")]
    origin: String,
}

async fn execute_list(config: &ShelfConfig, branch: Option<String>, json: bool) -> Result<()> {
    let (chain, _) = build_chain(config, branch)?;
    let listing = chain.list().await;
    report_fallback(&listing);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing.files)?);
        return Ok(());
    }

    if listing.files.is_empty() {
        println!("No remote fonts found");
        return Ok(());
    }

    let rows: Vec<RemoteRow> = listing
        .files
        .iter()
        .map(|f| RemoteRow {
            name: f.name.clone(),
            size: human_size(f.size_bytes),
            origin: f.origin.to_string(),
        })
        .collect();
    print_table(&rows);
    Ok(())
}

async fn execute_fetch(
    config: &ShelfConfig,
    name: &str,
    branch: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let (chain, cache) = build_chain(config, branch)?;
    let listing = chain.list().await;
    report_fallback(&listing);

    let file = listing
        .files
        .iter()
        .find(|f| f.name == name)
        .cloned()
        .unwrap_or_else(|| FontFile::new(name, 0, SourceOrigin::Remote));

    let loaded = chain
        .fetch(&file)
        .await
        .with_context(|| format!("Failed to fetch '{name}'"))?;

    if let Some(cache) = &cache {
        if let Err(e) = cache.store(name, &loaded.bytes).await {
            warn!("Failed to cache '{}': {}", name, e);
        }
    }

    let output = output.unwrap_or_else(|| PathBuf::from(name));
    std::fs::write(&output, &loaded.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Fetched '{}' ({} bytes)", name, loaded.bytes.len());
    println!(
        "Saved {} to {} ({})",
        name,
        output.display(),
        human_size(loaded.bytes.len() as u64)
    );
    Ok(())
}

async fn execute_catalog(config: &ShelfConfig, branch: Option<String>, json: bool) -> Result<()> {
    let (chain, _) = build_chain(config, branch)?;
    let listing = chain.list().await;
    report_fallback(&listing);

    let catalog = Catalog::build(&listing.files);
    print_catalog(&catalog, json)
}
