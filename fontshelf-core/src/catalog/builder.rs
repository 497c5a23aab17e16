//! Catalog construction from font listings
//!
//! A `Catalog` is a disposable projection of the current file list. It is
//! rebuilt from scratch whenever the list changes and never patched in place.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use super::name::{self, ParsedName};
use crate::font::FontFile;

/// All selectable variants of one base name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub base_name: String,

    /// Unique variants, numeric ones ascending by value, others after
    pub variants: Vec<String>,

    /// A file with this exact base name and no variant exists
    pub has_unnumbered: bool,
}

impl CatalogEntry {
    fn new(base_name: &str) -> Self {
        Self {
            base_name: base_name.to_string(),
            variants: Vec::new(),
            has_unnumbered: false,
        }
    }

    /// Options for the number picker: numbered variants, then the unnumbered file
    pub fn options(&self) -> Vec<Option<&str>> {
        let mut options: Vec<Option<&str>> =
            self.variants.iter().map(|v| Some(v.as_str())).collect();
        if self.has_unnumbered {
            options.push(None);
        }
        options
    }

    pub fn contains(&self, variant: Option<&str>) -> bool {
        match variant {
            Some(v) => self.variants.iter().any(|known| known == v),
            None => self.has_unnumbered,
        }
    }

    fn sort_variants(&mut self) {
        self.variants.sort_by(|a, b| compare_variants(a, b));
        self.variants.dedup();
    }
}

/// A file in the catalog together with its parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub file: FontFile,
    pub parsed: ParsedName,
}

/// One flattened selectable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem<'a> {
    pub base_name: &'a str,
    pub variant: Option<&'a str>,
}

/// Catalog of base names and their variants
///
/// Serializes to the sorted entries only, so two catalogs built from the
/// same files in different orders serialize identically.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,

    #[serde(skip)]
    files: Vec<CatalogFile>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a file listing
    ///
    /// Files without an accepted font extension are skipped with a warning.
    /// Duplicate file names keep their first occurrence.
    pub fn build(files: &[FontFile]) -> Self {
        let mut entries: BTreeMap<String, CatalogEntry> = BTreeMap::new();
        let mut catalog_files = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();

        for file in files {
            if !file.has_accepted_extension() {
                warn!("Skipping '{}': not a supported font file", file.name);
                continue;
            }
            if !seen.insert(file.name.as_str()) {
                debug!("Skipping duplicate listing for '{}'", file.name);
                continue;
            }

            let parsed = name::parse(&file.name);
            let entry = entries
                .entry(parsed.base_name.clone())
                .or_insert_with(|| CatalogEntry::new(&parsed.base_name));

            match &parsed.variant {
                Some(variant) => entry.variants.push(variant.clone()),
                None => entry.has_unnumbered = true,
            }

            catalog_files.push(CatalogFile {
                file: file.clone(),
                parsed,
            });
        }

        for entry in entries.values_mut() {
            entry.sort_variants();
        }

        debug!(
            "Built catalog: {} base names from {} files",
            entries.len(),
            catalog_files.len()
        );

        Self {
            entries,
            files: catalog_files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct base names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Base names in ascending case-sensitive order
    pub fn base_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entry(&self, base_name: &str) -> Option<&CatalogEntry> {
        self.entries.get(base_name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Number picker options for a base name; empty when unknown
    pub fn numbers_for(&self, base_name: &str) -> Vec<Option<&str>> {
        self.entries
            .get(base_name)
            .map(CatalogEntry::options)
            .unwrap_or_default()
    }

    /// Every selectable `(base name, variant)` pair in display order
    pub fn items(&self) -> Vec<CatalogItem<'_>> {
        self.entries
            .values()
            .flat_map(|entry| {
                entry.options().into_iter().map(move |variant| CatalogItem {
                    base_name: entry.base_name.as_str(),
                    variant,
                })
            })
            .collect()
    }

    /// Files in the order they were listed
    pub fn files(&self) -> &[CatalogFile] {
        &self.files
    }

    /// Look up a file by its exact name
    pub fn file(&self, file_name: &str) -> Option<&FontFile> {
        self.files
            .iter()
            .find(|f| f.file.name == file_name)
            .map(|f| &f.file)
    }

    /// Render the sorted entries as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Merge listings given in priority order, keeping the first file per name
///
/// Mirrors the upload store behavior where files on disk shadow in-memory
/// copies of the same name.
pub fn merge_listings<I>(sources: I) -> Vec<FontFile>
where
    I: IntoIterator<Item = Vec<FontFile>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for listing in sources {
        for file in listing {
            if seen.insert(file.name.clone()) {
                merged.push(file);
            }
        }
    }

    merged
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Order variants: numeric by value (no overflow on long digit runs), then
/// non-numeric by string. Equal values fall back to the raw string so "01"
/// and "1" get a stable order.
pub fn compare_variants(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => {
            let a_digits = a.trim_start_matches('0');
            let b_digits = b.trim_start_matches('0');
            a_digits
                .len()
                .cmp(&b_digits.len())
                .then_with(|| a_digits.cmp(b_digits))
                .then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::SourceOrigin;
    use pretty_assertions::assert_eq;

    fn files(names: &[&str]) -> Vec<FontFile> {
        names
            .iter()
            .map(|n| FontFile::new(*n, 100, SourceOrigin::Local))
            .collect()
    }

    #[test]
    fn test_groups_by_base_name() {
        let catalog = Catalog::build(&files(&[
            "YAMADA_02.woff2",
            "SATO_01.woff2",
            "YAMADA_01.woff2",
            "font_6.woff2",
        ]));

        assert_eq!(catalog.base_names(), vec!["SATO", "YAMADA", "font"]);
        assert_eq!(
            catalog.entry("YAMADA").unwrap().variants,
            vec!["01".to_string(), "02".to_string()]
        );
    }

    #[test]
    fn test_numeric_variant_order() {
        let catalog = Catalog::build(&files(&[
            "A_10.ttf", "A_9.ttf", "A_02.ttf", "A_1.ttf", "A_100.ttf",
        ]));
        assert_eq!(
            catalog.entry("A").unwrap().variants,
            vec!["1", "02", "9", "10", "100"]
        );
    }

    #[test]
    fn test_compare_variants_mixed() {
        let mut values = vec!["b", "10", "a", "2"];
        values.sort_by(|a, b| compare_variants(a, b));
        assert_eq!(values, vec!["2", "10", "a", "b"]);
    }

    #[test]
    fn test_unnumbered_file_stays_standalone() {
        let catalog = Catalog::build(&files(&["SATO.woff2", "SATO_01.woff2"]));
        let entry = catalog.entry("SATO").unwrap();
        assert_eq!(entry.variants, vec!["01"]);
        assert!(entry.has_unnumbered);
        assert_eq!(entry.options(), vec![Some("01"), None]);
    }

    #[test]
    fn test_unsupported_extension_skipped() {
        let catalog = Catalog::build(&files(&["readme.txt", "font_6.woff2"]));
        assert_eq!(catalog.base_names(), vec!["font"]);
        assert_eq!(catalog.files().len(), 1);
    }

    #[test]
    fn test_empty_input_gives_empty_catalog() {
        let catalog = Catalog::build(&[]);
        assert!(catalog.is_empty());
        assert!(catalog.items().is_empty());
    }

    #[test]
    fn test_items_flatten_in_display_order() {
        let catalog = Catalog::build(&files(&["B_2.otf", "A.otf", "B_1.otf"]));
        let items: Vec<(&str, Option<&str>)> = catalog
            .items()
            .into_iter()
            .map(|i| (i.base_name, i.variant))
            .collect();
        assert_eq!(
            items,
            vec![("A", None), ("B", Some("1")), ("B", Some("2"))]
        );
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut listing = files(&["font_6.woff2"]);
        listing.push(FontFile::new("font_6.woff2", 999, SourceOrigin::Cache));
        let catalog = Catalog::build(&listing);
        assert_eq!(catalog.files().len(), 1);
        assert_eq!(catalog.file("font_6.woff2").unwrap().size_bytes, 100);
    }

    #[test]
    fn test_merge_listings_prefers_earlier_sources() {
        let disk = vec![FontFile::new("a_1.ttf", 10, SourceOrigin::Local)];
        let memory = vec![
            FontFile::new("a_1.ttf", 20, SourceOrigin::Cache),
            FontFile::new("b_1.ttf", 30, SourceOrigin::Cache),
        ];

        let merged = merge_listings(vec![disk, memory]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].size_bytes, 10);
        assert_eq!(merged[1].name, "b_1.ttf");
    }
}
