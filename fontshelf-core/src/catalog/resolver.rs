//! Selection resolution: `(base name, variant)` back to a concrete file
//!
//! Lookup order:
//! 1. Exact `{base name, variant}` match when a real variant was requested
//! 2. First file with the base name, when no variant was requested
//! 3. Literal file stem equal to the requested string
//! 4. Not found
//!
//! An explicit variant that misses never degrades to another variant of the
//! same base name. Only the literal stem lookup can still rescue it.

use serde::Serialize;
use tracing::{debug, trace};

use super::builder::Catalog;
use crate::font::FontFile;
use crate::render::css_string;

/// Marker a picker sends for "no variant selected"
pub const NO_VARIANT: &str = "none";

/// Generic family used when a selection cannot be resolved
pub const FALLBACK_FAMILY: &str = "sans-serif";

/// Label shown in place of a family name when resolution fails
pub const NOT_FOUND_LABEL: &str = "(not found)";

/// Which lookup step produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStep {
    ExactVariant,
    BaseName,
    LiteralStem,
}

/// Outcome of a selection lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found {
        file: &'a FontFile,
        step: MatchStep,
    },
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn file(&self) -> Option<&'a FontFile> {
        match self {
            Resolution::Found { file, .. } => Some(file),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    /// CSS font-family value for the preview: quoted custom family or the fallback
    pub fn font_family(&self) -> String {
        match self {
            Resolution::Found { file, .. } => css_string(file.stem(), '"'),
            Resolution::NotFound => FALLBACK_FAMILY.to_string(),
        }
    }

    /// Label for the "current font" display
    pub fn display_label(&self) -> String {
        match self {
            Resolution::Found { file, .. } => file.stem().to_string(),
            Resolution::NotFound => NOT_FOUND_LABEL.to_string(),
        }
    }
}

/// Normalize a requested variant: empty strings and the sentinel mean "none"
pub fn requested_variant(variant: Option<&str>) -> Option<&str> {
    variant.filter(|v| !v.is_empty() && *v != NO_VARIANT)
}

/// Resolve a selection against a catalog
pub fn resolve<'a>(catalog: &'a Catalog, base_name: &str, variant: Option<&str>) -> Resolution<'a> {
    let variant = requested_variant(variant);
    let files = catalog.files();

    match variant {
        Some(variant) => {
            if let Some(found) = files.iter().find(|f| {
                f.parsed.base_name == base_name && f.parsed.variant.as_deref() == Some(variant)
            }) {
                trace!("Resolved {}/{} by exact variant", base_name, variant);
                return Resolution::Found {
                    file: &found.file,
                    step: MatchStep::ExactVariant,
                };
            }
        }
        None => {
            if let Some(found) = files.iter().find(|f| f.parsed.base_name == base_name) {
                trace!("Resolved {} by base name", base_name);
                return Resolution::Found {
                    file: &found.file,
                    step: MatchStep::BaseName,
                };
            }
        }
    }

    let composed = variant.map(|v| format!("{base_name}_{v}"));
    let literal = composed.as_deref().unwrap_or(base_name);
    if let Some(found) = files.iter().find(|f| f.file.stem() == literal) {
        trace!("Resolved '{}' by literal file stem", literal);
        return Resolution::Found {
            file: &found.file,
            step: MatchStep::LiteralStem,
        };
    }

    debug!(
        "No font for base name '{}' variant {:?}",
        base_name, variant
    );
    Resolution::NotFound
}

/// Resolve a full literal file name or stem, e.g. `SATO_02` or `SATO_02.woff2`
pub fn resolve_literal<'a>(catalog: &'a Catalog, requested: &str) -> Resolution<'a> {
    let files = catalog.files();

    if let Some(found) = files
        .iter()
        .find(|f| f.file.name == requested || f.file.stem() == requested)
    {
        return Resolution::Found {
            file: &found.file,
            step: MatchStep::LiteralStem,
        };
    }

    Resolution::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::SourceOrigin;

    fn catalog(names: &[&str]) -> Catalog {
        let files: Vec<FontFile> = names
            .iter()
            .map(|n| FontFile::new(*n, 1, SourceOrigin::Local))
            .collect();
        Catalog::build(&files)
    }

    #[test]
    fn test_exact_variant() {
        let catalog = catalog(&["SATO_01.woff2", "SATO_02.woff2"]);
        let resolution = resolve(&catalog, "SATO", Some("02"));
        assert_eq!(resolution.file().unwrap().name, "SATO_02.woff2");
        assert!(matches!(
            resolution,
            Resolution::Found {
                step: MatchStep::ExactVariant,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_variant_is_not_found() {
        let catalog = catalog(&["SATO_01.woff2"]);
        assert_eq!(resolve(&catalog, "SATO", Some("99")), Resolution::NotFound);
    }

    #[test]
    fn test_no_variant_takes_first_in_source_order() {
        let catalog = catalog(&["SATO_02.woff2", "SATO_01.woff2"]);
        for variant in [None, Some(""), Some(NO_VARIANT)] {
            let resolution = resolve(&catalog, "SATO", variant);
            assert_eq!(resolution.file().unwrap().name, "SATO_02.woff2");
        }
    }

    #[test]
    fn test_literal_stem_fallback() {
        let catalog = catalog(&["my_handwritten_font80.woff2"]);
        let resolution = resolve(&catalog, "my_handwritten_font80", None);
        assert_eq!(
            resolution.file().unwrap().name,
            "my_handwritten_font80.woff2"
        );
    }

    #[test]
    fn test_hyphen_separator_matches_exact() {
        let catalog = catalog(&["SATO-03.ttf"]);
        assert!(resolve(&catalog, "SATO", Some("03")).is_found());
    }

    #[test]
    fn test_composed_literal_stem() {
        // a_1_2 parses as {a_1, 2}, so {a, 1_2} only matches by stem
        let catalog = catalog(&["a_1_2.ttf"]);
        let resolution = resolve(&catalog, "a", Some("1_2"));
        assert!(matches!(
            resolution,
            Resolution::Found {
                step: MatchStep::LiteralStem,
                ..
            }
        ));
    }

    #[test]
    fn test_unnumbered_file_does_not_answer_for_missing_variant() {
        let catalog = catalog(&["SATO.woff2", "SATO_01.woff2"]);
        assert_eq!(resolve(&catalog, "SATO", Some("99")), Resolution::NotFound);
        assert_eq!(
            resolve(&catalog, "SATO", None).file().unwrap().name,
            "SATO.woff2"
        );
    }

    #[test]
    fn test_not_found_fallbacks() {
        let catalog = catalog(&[]);
        let resolution = resolve(&catalog, "SATO", Some("01"));
        assert_eq!(resolution.font_family(), FALLBACK_FAMILY);
        assert_eq!(resolution.display_label(), NOT_FOUND_LABEL);
    }

    #[test]
    fn test_found_family_is_quoted_stem() {
        let catalog = catalog(&["font_6.woff2"]);
        let resolution = resolve(&catalog, "font", Some("6"));
        assert_eq!(resolution.font_family(), "\"font_6\"");
        assert_eq!(resolution.display_label(), "font_6");
    }

    #[test]
    fn test_family_with_quote_is_escaped() {
        let catalog = catalog(&["Say\"Hi\"_1.ttf"]);
        let resolution = resolve(&catalog, "Say\"Hi\"", Some("1"));
        assert_eq!(resolution.font_family(), "\"Say\\\"Hi\\\"_1\"");
    }

    #[test]
    fn test_resolve_literal_accepts_name_or_stem() {
        let catalog = catalog(&["SATO_02.woff2"]);
        assert!(resolve_literal(&catalog, "SATO_02").is_found());
        assert!(resolve_literal(&catalog, "SATO_02.woff2").is_found());
        assert!(!resolve_literal(&catalog, "SATO").is_found());
    }
}
