//! fontshelf - upload, list and preview handwriting fonts
//!
//! Main entry point for the command line interface

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use fontshelf_core::catalog::{requested_variant, resolve, resolve_literal, Catalog, Resolution};
use fontshelf_core::config::ShelfConfig;
use fontshelf_core::font::FontFormat;
use fontshelf_core::fontlist;
use fontshelf_core::library::FontLibrary;
use fontshelf_core::preview::PreviewSession;
use fontshelf_core::render::{CssRenderTarget, RenderTarget, TextAlign, WritingMode};
use fontshelf_core::storage::{self, StorageKind, UploadFile};

mod remote_cli;

/// Trace modules for structured tracing
#[derive(Debug, Clone, ValueEnum)]
enum TraceModule {
    Catalog,
    Storage,
    Source,
    Render,
    All,
}

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Storage backend choice on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StorageArg {
    Filesystem,
    Memory,
    Layered,
}

impl From<StorageArg> for StorageKind {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Filesystem => StorageKind::Filesystem,
            StorageArg::Memory => StorageKind::Memory,
            StorageArg::Layered => StorageKind::Layered,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WritingModeArg {
    HorizontalTb,
    VerticalRl,
}

impl From<WritingModeArg> for WritingMode {
    fn from(arg: WritingModeArg) -> Self {
        match arg {
            WritingModeArg::HorizontalTb => WritingMode::HorizontalTb,
            WritingModeArg::VerticalRl => WritingMode::VerticalRl,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextAlignArg {
    Left,
    Center,
    Right,
}

impl From<TextAlignArg> for TextAlign {
    fn from(arg: TextAlignArg) -> Self {
        match arg {
            TextAlignArg::Left => TextAlign::Left,
            TextAlignArg::Center => TextAlign::Center,
            TextAlignArg::Right => TextAlign::Right,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "fontshelf",
    about = "Upload, list and preview handwriting font files",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Enable structured tracing (comma-separated: catalog,storage,source,render,all)
    #[clap(long, value_delimiter = ',', global = true)]
    trace: Vec<TraceModule>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Configuration file (YAML or JSON)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override the fonts directory
    #[clap(long, global = true)]
    fonts_dir: Option<PathBuf>,

    /// Override the storage backend
    #[clap(long, value_enum, global = true)]
    storage: Option<StorageArg>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored font files
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Upload one or more font files
    Upload {
        /// Font files to upload (.woff2, .woff, .ttf, .otf)
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },

    /// Copy a stored font out of the shelf
    Get {
        /// Stored file name
        name: String,

        /// Output path (defaults to the file name in the current directory)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a stored font
    Delete {
        /// Stored file name
        name: String,
    },

    /// Show base names and their variants
    Catalog {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Resolve a base name and variant to a stored file
    Resolve {
        /// Base name, e.g. SATO
        name: String,

        /// Variant, e.g. 02 ("none" for no variant)
        variant: Option<String>,
    },

    /// Compute a preview and optionally write its stylesheet
    Preview {
        /// Base name, e.g. SATO
        name: String,

        /// Variant, e.g. 02
        variant: Option<String>,

        /// Font size in px (5-200)
        #[clap(long, default_value_t = 60)]
        size: u32,

        /// Letter spacing in em (-0.5 to 1)
        #[clap(long, default_value_t = 0.0, allow_hyphen_values = true)]
        letter_spacing: f64,

        /// Line height (1-3)
        #[clap(long, default_value_t = 2.0)]
        line_height: f64,

        #[clap(long, value_enum, default_value = "horizontal-tb")]
        writing_mode: WritingModeArg,

        #[clap(long, value_enum, default_value = "left")]
        text_align: TextAlignArg,

        /// Write a stylesheet (font assets go next to it under fonts/)
        #[clap(long)]
        stylesheet: Option<PathBuf>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Work with the remote font repository
    Remote {
        #[clap(subcommand)]
        command: remote_cli::RemoteCommand,
    },

    /// Generate a fontlist.json manifest from a fonts directory
    Fontlist {
        /// Fonts directory (defaults to the configured one)
        #[clap(long)]
        dir: Option<PathBuf>,

        /// Output file
        #[clap(long, default_value = fontlist::FONTLIST_FILE)]
        output: PathBuf,
    },
}

fn initialize_tracing(log_level: &LogLevel, trace_modules: &[TraceModule]) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());

    for module in trace_modules {
        let directive = match module {
            TraceModule::Catalog => "fontshelf_core::catalog=trace",
            TraceModule::Storage => "fontshelf_core::storage=trace",
            TraceModule::Source => "fontshelf_core::source=trace",
            TraceModule::Render => "fontshelf_core::render=trace",
            TraceModule::All => "fontshelf_core=trace",
        };

        if let Ok(parsed) = directive.parse() {
            filter = filter.add_directive(parsed);
        }
    }

    if !trace_modules.is_empty() {
        // JSON output for structured tracing - MUST go to stderr
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();

        tracing::info!(trace_modules = ?trace_modules, "fontshelf tracing enabled");
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load configuration and apply command line overrides
fn load_config(cli: &Cli) -> Result<ShelfConfig> {
    let mut config = ShelfConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.fonts_dir {
        config.fonts_dir = dir.clone();
    }
    if let Some(kind) = cli.storage {
        config.storage = kind.into();
    }
    debug!(
        "Using {} storage at {}",
        config.storage,
        config.fonts_dir.display()
    );
    Ok(config)
}

fn open_library(config: &ShelfConfig) -> FontLibrary {
    let backend = storage::open(config.storage, &config.fonts_dir);
    FontLibrary::with_policy(backend, config.upload.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, &cli.trace);

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::List { json } => list_command(&config, json).await,
        Command::Upload { files } => upload_command(&config, &files).await,
        Command::Get { name, output } => get_command(&config, &name, output).await,
        Command::Delete { name } => delete_command(&config, &name).await,
        Command::Catalog { json } => catalog_command(&config, json).await,
        Command::Resolve { name, variant } => {
            resolve_command(&config, &name, variant.as_deref()).await
        }
        Command::Preview {
            name,
            variant,
            size,
            letter_spacing,
            line_height,
            writing_mode,
            text_align,
            stylesheet,
            json,
        } => {
            let mut session = PreviewSession::default();
            session
                .style
                .set_size_px(size)
                .set_letter_spacing_em(letter_spacing)
                .set_line_height(line_height);
            session.style.writing_mode = writing_mode.into();
            session.style.text_align = text_align.into();

            preview_command(
                &config,
                session,
                &name,
                variant.as_deref(),
                stylesheet.as_deref(),
                json,
            )
            .await
        }
        Command::Remote { command } => command.execute(&config).await,
        Command::Fontlist { dir, output } => {
            let dir = dir.unwrap_or_else(|| config.fonts_dir.clone());
            let count = fontlist::write(&dir, &output)?;
            println!("Wrote {} font(s) to {}", count, output.display());
            Ok(())
        }
    }
}

/// Table row for stored fonts
#[derive(Tabled)]
struct FontRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Added")]
    added: String,
}

pub(crate) fn human_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= KIB * KIB {
        format!("{:.1} MiB", bytes_f / (KIB * KIB))
    } else if bytes_f >= KIB {
        format!("{:.1} KiB", bytes_f / KIB)
    } else {
        format!("{bytes} B")
    }
}

pub(crate) fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
}

async fn list_command(config: &ShelfConfig, json: bool) -> Result<()> {
    let library = open_library(config);
    let files = library.list().await.context("Failed to list fonts")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("No fonts stored in {}", config.fonts_dir.display());
        return Ok(());
    }

    let rows: Vec<FontRow> = files
        .iter()
        .map(|f| FontRow {
            name: f.name.clone(),
            size: human_size(f.size_bytes),
            format: f.format().map(|fmt| fmt.to_string()).unwrap_or_default(),
            added: f
                .added_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    print_table(&rows);
    Ok(())
}

async fn upload_command(config: &ShelfConfig, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?;
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(UploadFile::new(name, bytes));
    }

    let library = open_library(config);
    let stored = library.upload(files).await?;
    for file in &stored {
        println!("Uploaded {} ({})", file.name, human_size(file.size_bytes));
    }
    info!("{} font(s) uploaded", stored.len());
    Ok(())
}

async fn get_command(config: &ShelfConfig, name: &str, output: Option<PathBuf>) -> Result<()> {
    let library = open_library(config);
    let loaded = library.get(name).await?;
    let output = output.unwrap_or_else(|| PathBuf::from(name));

    std::fs::write(&output, &loaded.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mime = loaded
        .file
        .format()
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");
    println!(
        "Saved {} to {} ({}, {})",
        name,
        output.display(),
        mime,
        human_size(loaded.bytes.len() as u64)
    );
    Ok(())
}

async fn delete_command(config: &ShelfConfig, name: &str) -> Result<()> {
    let library = open_library(config);
    library.delete(name).await?;
    println!("Deleted {name}");
    Ok(())
}

/// Table row for catalog entries
#[derive(Tabled)]
pub(crate) struct CatalogRow {
    #[tabled(rename = "Base name")]
    base_name: String,
    #[tabled(rename = "Variants")]
    variants: String,
    #[tabled(rename = "Unnumbered")]
    unnumbered: String,
}

pub(crate) fn print_catalog(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", catalog.to_json()?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("Catalog is empty");
        return Ok(());
    }

    let rows: Vec<CatalogRow> = catalog
        .entries()
        .map(|entry| CatalogRow {
            base_name: entry.base_name.clone(),
            variants: entry.variants.join(", "),
            unnumbered: if entry.has_unnumbered { "yes" } else { "" }.to_string(),
        })
        .collect();
    print_table(&rows);
    Ok(())
}

async fn catalog_command(config: &ShelfConfig, json: bool) -> Result<()> {
    let library = open_library(config);
    let catalog = library.catalog().await;
    print_catalog(&catalog, json)
}

pub(crate) fn print_resolution(resolution: &Resolution<'_>) {
    match resolution {
        Resolution::Found { file, step } => {
            println!("{} (matched by {:?})", file.name, step);
        }
        Resolution::NotFound => {
            println!("{}", resolution.display_label());
        }
    }
}

async fn resolve_command(config: &ShelfConfig, name: &str, variant: Option<&str>) -> Result<()> {
    let library = open_library(config);
    let catalog = library.catalog().await;
    let mut resolution = resolve(&catalog, name, variant);
    // Without a variant, a full file name like `SATO_02.woff2` is accepted too
    if !resolution.is_found() && requested_variant(variant).is_none() {
        resolution = resolve_literal(&catalog, name);
    }
    print_resolution(&resolution);

    if !resolution.is_found() {
        bail!("No font matches '{}' {}", name, variant.unwrap_or(""));
    }
    Ok(())
}

/// Table row for preview details
#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Setting")]
    setting: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

async fn preview_command(
    config: &ShelfConfig,
    mut session: PreviewSession,
    name: &str,
    variant: Option<&str>,
    stylesheet: Option<&Path>,
    json: bool,
) -> Result<()> {
    let library = open_library(config);
    session.refresh(library.catalog().await);
    session.select(name, variant);
    let preview = session.preview();

    if let Some(path) = stylesheet {
        let assets = path
            .parent()
            .map(|p| p.join("fonts"))
            .unwrap_or_else(|| PathBuf::from("fonts"));
        let target = CssRenderTarget::new(assets, "fonts/");

        if let (Some(file), Some(family)) = (&preview.file, &preview.family) {
            let loaded = library.get(&file.name).await?;
            let format = file.format().unwrap_or(FontFormat::Woff2);
            target.register_font(family, loaded.bytes, format).await?;
        }
        target.apply_style(&preview.declaration).await?;
        target.fonts_ready().await?;
        target.write_stylesheet(path).await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let rows = vec![
        PreviewRow {
            setting: "Font",
            value: preview.label.clone(),
        },
        PreviewRow {
            setting: "File",
            value: preview
                .file
                .as_ref()
                .map(|f| f.name.clone())
                .unwrap_or_else(|| "-".to_string()),
        },
        PreviewRow {
            setting: "Size",
            value: preview.declaration.font_size.clone(),
        },
        PreviewRow {
            setting: "Letter spacing",
            value: preview.declaration.letter_spacing.clone(),
        },
        PreviewRow {
            setting: "Line height",
            value: preview.declaration.line_height.clone(),
        },
        PreviewRow {
            setting: "Writing mode",
            value: preview.writing_mode_label.clone(),
        },
        PreviewRow {
            setting: "Alignment",
            value: preview.text_align_label.clone(),
        },
    ];
    print_table(&rows);
    println!("{}", preview.declaration.to_css());
    Ok(())
}
