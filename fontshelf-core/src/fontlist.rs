//! Static `fontlist.json` manifest
//!
//! Hosts without a listing endpoint serve this file instead. It is
//! regenerated from the fonts directory at build time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::font::{FontFile, FontFormat, SourceOrigin};

/// Default manifest file name
pub const FONTLIST_FILE: &str = "fontlist.json";

/// One manifest row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontListEntry {
    pub name: String,
}

/// Collect font file names directly inside `fonts_dir`, sorted by name.
/// A missing directory yields an empty list.
pub fn generate(fonts_dir: &Path) -> Result<Vec<FontListEntry>> {
    if !fonts_dir.exists() {
        warn!(
            "Fonts directory {} not found; generating an empty font list",
            fonts_dir.display()
        );
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(fonts_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("Failed to read fonts directory: {}", fonts_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if FontFormat::from_file_name(name).is_some() {
            entries.push(FontListEntry {
                name: name.to_string(),
            });
        }
    }

    Ok(entries)
}

/// Pretty JSON for a manifest
pub fn to_json(entries: &[FontListEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("Failed to serialize font list")
}

/// Generate the manifest for `fonts_dir` and write it to `output`
pub fn write(fonts_dir: &Path, output: &Path) -> Result<usize> {
    let entries = generate(fonts_dir)?;
    let json = to_json(&entries)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write font list: {}", output.display()))?;

    info!(
        "Wrote {} font entries to {}",
        entries.len(),
        output.display()
    );
    Ok(entries.len())
}

/// Parse a manifest back into font descriptors
pub fn parse(json: &str) -> Result<Vec<FontFile>> {
    let entries: Vec<FontListEntry> =
        serde_json::from_str(json).context("Failed to parse font list")?;
    Ok(entries
        .into_iter()
        .map(|e| FontFile::new(e.name, 0, SourceOrigin::Local))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let entries = generate(&temp_dir.path().join("fonts")).unwrap();
        assert!(entries.is_empty());
        assert_eq!(to_json(&entries).unwrap(), "[]");
    }

    #[test]
    fn test_generate_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let fonts = temp_dir.path().join("fonts");
        std::fs::create_dir_all(fonts.join("nested.ttf")).unwrap();
        for name in ["SATO_02.woff2", "README.md", "AOKI_1.TTF", "SATO_01.woff2"] {
            std::fs::write(fonts.join(name), [0]).unwrap();
        }

        let names: Vec<String> = generate(&fonts)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["AOKI_1.TTF", "SATO_01.woff2", "SATO_02.woff2"]);
    }

    #[test]
    fn test_write_and_parse() {
        let temp_dir = TempDir::new().unwrap();
        let fonts = temp_dir.path().join("fonts");
        std::fs::create_dir_all(&fonts).unwrap();
        std::fs::write(fonts.join("font_6.woff"), [0]).unwrap();

        let output = temp_dir.path().join(FONTLIST_FILE);
        assert_eq!(write(&fonts, &output).unwrap(), 1);

        let json = std::fs::read_to_string(&output).unwrap();
        assert_eq!(json, "[\n  {\n    \"name\": \"font_6.woff\"\n  }\n]");

        let files = parse(&json).unwrap();
        assert_eq!(files[0].name, "font_6.woff");
    }
}
