//! File name parsing into a base name and variant number
//!
//! Patterns are tried in a fixed order and the first match wins. Several
//! patterns overlap, so the order is part of the observable behavior:
//!
//! | Pattern | Regex                   | Base     | Variant  |
//! |---------|-------------------------|----------|----------|
//! | A       | `^(.+?)[-_]([0-9]+)$`   | group 1  | group 2  |
//! | B       | `^([A-Za-z]+)([0-9]+)$` | group 1  | group 2  |
//! | C       | `^([0-9]+)([A-Za-z]+)$` | group 2  | group 1  |
//!
//! Digits are ASCII only; full-width or other script digits stay in the base
//! name. A name matching none of them keeps the whole stem as its base name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(woff2|woff|ttf|otf)$").expect("valid extension regex"));

static SEPARATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)[-_]([0-9]+)$").expect("valid separated regex"));

static LETTERS_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("valid letters-digits regex"));

static DIGITS_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)([A-Za-z]+)$").expect("valid digits-letters regex"));

/// Which rule produced a `ParsedName`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePattern {
    /// `NAME_01`, `NAME-01`
    Separated,
    /// `NAME01`
    LettersDigits,
    /// `01NAME`
    DigitsLetters,
    /// No pattern matched; the full stem is the base name
    Literal,
}

/// A file name split into base name and optional variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedName {
    pub base_name: String,
    /// Variant digits as written, leading zeros kept
    pub variant: Option<String>,
}

impl ParsedName {
    pub fn new(base_name: impl Into<String>, variant: Option<&str>) -> Self {
        Self {
            base_name: base_name.into(),
            variant: variant.map(str::to_string),
        }
    }

    /// Family label used by the preview, `NAME_01` or the bare base name
    pub fn display_name(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}_{}", self.base_name, variant),
            None => self.base_name.clone(),
        }
    }
}

/// Strip a trailing font extension (case-insensitive); other names pass through
pub fn strip_extension(file_name: &str) -> &str {
    match EXTENSION.find(file_name) {
        Some(m) => &file_name[..m.start()],
        None => file_name,
    }
}

/// Parse a file name into base name and variant
pub fn parse(file_name: &str) -> ParsedName {
    parse_with_pattern(file_name).0
}

/// Parse a file name and report which pattern matched
pub fn parse_with_pattern(file_name: &str) -> (ParsedName, NamePattern) {
    let stem = strip_extension(file_name);

    if let Some(caps) = SEPARATED.captures(stem) {
        return (
            ParsedName::new(&caps[1], Some(&caps[2])),
            NamePattern::Separated,
        );
    }

    if let Some(caps) = LETTERS_DIGITS.captures(stem) {
        return (
            ParsedName::new(&caps[1], Some(&caps[2])),
            NamePattern::LettersDigits,
        );
    }

    if let Some(caps) = DIGITS_LETTERS.captures(stem) {
        return (
            ParsedName::new(&caps[2], Some(&caps[1])),
            NamePattern::DigitsLetters,
        );
    }

    (ParsedName::new(stem, None), NamePattern::Literal)
}
