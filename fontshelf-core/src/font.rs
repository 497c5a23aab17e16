//! Font file model
//!
//! A `FontFile` describes one stored font by name. Bytes are fetched on
//! demand from whichever storage or source produced the descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted font extensions, longest first so `.woff2` wins over `.woff`
pub const ACCEPTED_EXTENSIONS: [&str; 4] = [".woff2", ".woff", ".ttf", ".otf"];

/// Font container format, as declared in `@font-face` rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Woff2,
    Woff,
    TrueType,
    OpenType,
}

impl FontFormat {
    /// Detect the format from a file name's extension (case-insensitive)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".woff2") {
            Some(FontFormat::Woff2)
        } else if lower.ends_with(".woff") {
            Some(FontFormat::Woff)
        } else if lower.ends_with(".ttf") {
            Some(FontFormat::TrueType)
        } else if lower.ends_with(".otf") {
            Some(FontFormat::OpenType)
        } else {
            None
        }
    }

    /// Value for the `format()` hint of an `@font-face` src
    pub fn css_format(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::TrueType => "truetype",
            FontFormat::OpenType => "opentype",
        }
    }

    /// Content type used when serving the raw bytes
    pub fn mime_type(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "font/woff2",
            FontFormat::Woff => "font/woff",
            FontFormat::TrueType => "font/ttf",
            FontFormat::OpenType => "font/otf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => ".woff2",
            FontFormat::Woff => ".woff",
            FontFormat::TrueType => ".ttf",
            FontFormat::OpenType => ".otf",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_format())
    }
}

/// Where a font descriptor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    /// Upload storage owned by this process (directory or memory)
    Local,
    /// Remote repository
    Remote,
    /// On-device side cache of previously fetched bytes
    Cache,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceOrigin::Local => "local",
            SourceOrigin::Remote => "remote",
            SourceOrigin::Cache => "cache",
        };
        f.write_str(label)
    }
}

/// A stored font file, identified by its case-sensitive file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFile {
    /// File name including extension, e.g. `SATO_02.woff2`
    pub name: String,

    /// Payload size in bytes
    pub size_bytes: u64,

    pub origin: SourceOrigin,

    /// When the file was stored (filesystem mtime or upload time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,

    /// Where to download the bytes from, for remote descriptors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

impl FontFile {
    pub fn new(name: impl Into<String>, size_bytes: u64, origin: SourceOrigin) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            origin,
            added_at: None,
            locator: None,
        }
    }

    pub fn with_added_at(mut self, added_at: DateTime<Utc>) -> Self {
        self.added_at = Some(added_at);
        self
    }

    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    pub fn format(&self) -> Option<FontFormat> {
        FontFormat::from_file_name(&self.name)
    }

    /// Whether the name carries one of the accepted font extensions
    pub fn has_accepted_extension(&self) -> bool {
        self.format().is_some()
    }

    /// File name minus its font extension; also the registered font-family name
    pub fn stem(&self) -> &str {
        match self.format() {
            Some(format) => &self.name[..self.name.len() - format.extension().len()],
            None => &self.name,
        }
    }
}

/// A font descriptor together with its bytes
#[derive(Debug, Clone)]
pub struct LoadedFont {
    pub file: FontFile,
    pub bytes: Vec<u8>,
}

impl LoadedFont {
    pub fn new(file: FontFile, bytes: Vec<u8>) -> Self {
        Self { file, bytes }
    }
}

/// True when `name` is a bare file name (no directories, no traversal)
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            FontFormat::from_file_name("a.woff2"),
            Some(FontFormat::Woff2)
        );
        assert_eq!(FontFormat::from_file_name("a.WOFF"), Some(FontFormat::Woff));
        assert_eq!(
            FontFormat::from_file_name("a.ttf"),
            Some(FontFormat::TrueType)
        );
        assert_eq!(
            FontFormat::from_file_name("a.Otf"),
            Some(FontFormat::OpenType)
        );
        assert_eq!(FontFormat::from_file_name("a.png"), None);
        assert_eq!(FontFormat::from_file_name("woff2"), None);
    }

    #[test]
    fn test_css_format_and_mime() {
        assert_eq!(FontFormat::TrueType.css_format(), "truetype");
        assert_eq!(FontFormat::OpenType.css_format(), "opentype");
        assert_eq!(FontFormat::TrueType.mime_type(), "font/ttf");
        assert_eq!(FontFormat::Woff2.mime_type(), "font/woff2");
    }

    #[test]
    fn test_stem_keeps_case_of_base() {
        let file = FontFile::new("SATO_02.WOFF2", 10, SourceOrigin::Local);
        assert_eq!(file.stem(), "SATO_02");

        let odd = FontFile::new("notes.txt", 10, SourceOrigin::Local);
        assert_eq!(odd.stem(), "notes.txt");
        assert!(!odd.has_accepted_extension());
    }

    #[test]
    fn test_plain_file_name() {
        assert!(is_plain_file_name("font_6.woff2"));
        assert!(!is_plain_file_name("../etc/passwd"));
        assert!(!is_plain_file_name("dir/font.ttf"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
    }
}
