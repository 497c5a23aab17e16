//! Render targets and the preview style model
//!
//! A render target is wherever a preview ends up: a stylesheet on disk, a
//! browser page, a test double. Fonts are registered asynchronously and
//! `fonts_ready` resolves once every pending registration has finished.
//! Styles may be applied before that.

pub mod css;

pub use css::{CssRenderTarget, FontFaceRule};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::FALLBACK_FAMILY;
use crate::error::FontResult;
use crate::font::FontFormat;

pub const DEFAULT_SIZE_PX: u32 = 60;
pub const MIN_SIZE_PX: u32 = 5;
pub const MAX_SIZE_PX: u32 = 200;

pub const DEFAULT_LETTER_SPACING_EM: f64 = 0.0;
pub const MIN_LETTER_SPACING_EM: f64 = -0.5;
pub const MAX_LETTER_SPACING_EM: f64 = 1.0;

pub const DEFAULT_LINE_HEIGHT: f64 = 2.0;
pub const MIN_LINE_HEIGHT: f64 = 1.0;
pub const MAX_LINE_HEIGHT: f64 = 3.0;

/// Class added to the preview element in vertical mode
pub const VERTICAL_WRITING_CLASS: &str = "vertical-writing";

/// Quote `value` as a CSS string, escaping backslashes and the quote character
pub fn css_string(value: &str, quote: char) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(quote);
    for c in value.chars() {
        if c == quote || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}

/// Trait for preview render targets
#[async_trait]
pub trait RenderTarget: Send + Sync {
    /// Make `bytes` available under `family`
    async fn register_font(&self, family: &str, bytes: Vec<u8>, format: FontFormat)
        -> FontResult<()>;

    /// Apply the inline style of the preview element
    async fn apply_style(&self, style: &StyleDeclaration) -> FontResult<()>;

    /// Resolves once every registration started so far has finished
    async fn fonts_ready(&self) -> FontResult<()>;

    /// Target identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Text direction of the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WritingMode {
    #[default]
    #[serde(rename = "horizontal-tb")]
    HorizontalTb,
    #[serde(rename = "vertical-rl")]
    VerticalRl,
}

impl WritingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "horizontal-tb" | "horizontal" => Some(WritingMode::HorizontalTb),
            "vertical-rl" | "vertical" => Some(WritingMode::VerticalRl),
            _ => None,
        }
    }

    pub fn css_value(&self) -> &'static str {
        match self {
            WritingMode::HorizontalTb => "horizontal-tb",
            WritingMode::VerticalRl => "vertical-rl",
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, WritingMode::VerticalRl)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WritingMode::HorizontalTb => "horizontal",
            WritingMode::VerticalRl => "vertical",
        }
    }
}

impl fmt::Display for WritingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_value())
    }
}

/// Alignment as picked by the user; meaning depends on the writing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" | "top" | "start" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" | "bottom" | "end" => Some(TextAlign::Right),
            _ => None,
        }
    }

    /// `text-align` value under `mode`
    pub fn css_value(&self, mode: WritingMode) -> &'static str {
        match (mode.is_vertical(), self) {
            (false, TextAlign::Left) => "left",
            (false, TextAlign::Center) => "center",
            (false, TextAlign::Right) => "right",
            (true, TextAlign::Left) => "start",
            (true, TextAlign::Center) => "center",
            (true, TextAlign::Right) => "end",
        }
    }

    /// Helper class for vertical layouts
    pub fn vertical_class(&self) -> &'static str {
        match self {
            TextAlign::Left => "vertical-align-top",
            TextAlign::Center => "vertical-align-center",
            TextAlign::Right => "vertical-align-bottom",
        }
    }

    pub fn label(&self, mode: WritingMode) -> &'static str {
        match (mode.is_vertical(), self) {
            (false, TextAlign::Left) => "left",
            (false, TextAlign::Right) => "right",
            (true, TextAlign::Left) => "top",
            (true, TextAlign::Right) => "bottom",
            (_, TextAlign::Center) => "center",
        }
    }
}

/// Adjustable preview parameters; setters clamp into range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewStyle {
    size_px: u32,
    letter_spacing_em: f64,
    line_height: f64,
    pub writing_mode: WritingMode,
    pub text_align: TextAlign,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            size_px: DEFAULT_SIZE_PX,
            letter_spacing_em: DEFAULT_LETTER_SPACING_EM,
            line_height: DEFAULT_LINE_HEIGHT,
            writing_mode: WritingMode::default(),
            text_align: TextAlign::default(),
        }
    }
}

impl PreviewStyle {
    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    pub fn letter_spacing_em(&self) -> f64 {
        self.letter_spacing_em
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn set_size_px(&mut self, size: u32) -> &mut Self {
        self.size_px = size.clamp(MIN_SIZE_PX, MAX_SIZE_PX);
        self
    }

    pub fn set_letter_spacing_em(&mut self, spacing: f64) -> &mut Self {
        self.letter_spacing_em = clamp_or(
            spacing,
            MIN_LETTER_SPACING_EM,
            MAX_LETTER_SPACING_EM,
            DEFAULT_LETTER_SPACING_EM,
        );
        self
    }

    pub fn set_line_height(&mut self, line_height: f64) -> &mut Self {
        self.line_height = clamp_or(
            line_height,
            MIN_LINE_HEIGHT,
            MAX_LINE_HEIGHT,
            DEFAULT_LINE_HEIGHT,
        );
        self
    }

    /// Inline declaration for `family`, or the fallback family when `None`
    pub fn declaration(&self, family: Option<&str>) -> StyleDeclaration {
        let font_family = match family {
            Some(family) => css_string(family, '"'),
            None => FALLBACK_FAMILY.to_string(),
        };

        let mut classes = Vec::new();
        if self.writing_mode.is_vertical() {
            classes.push(VERTICAL_WRITING_CLASS.to_string());
            classes.push(self.text_align.vertical_class().to_string());
        }

        StyleDeclaration {
            font_family,
            font_size: format!("{}px", self.size_px),
            letter_spacing: format!("{}em", self.letter_spacing_em),
            line_height: format!("{}", self.line_height),
            writing_mode: self.writing_mode.css_value().to_string(),
            text_align: self.text_align.css_value(self.writing_mode).to_string(),
            classes,
        }
    }
}

// NaN is not orderable; treat it as "reset"
fn clamp_or(value: f64, min: f64, max: f64, default: f64) -> f64 {
    if value.is_nan() {
        default
    } else {
        value.clamp(min, max)
    }
}

/// Computed inline style of the preview element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDeclaration {
    pub font_family: String,
    pub font_size: String,
    pub letter_spacing: String,
    pub line_height: String,
    pub writing_mode: String,
    pub text_align: String,
    /// Helper classes for the preview element
    pub classes: Vec<String>,
}

impl StyleDeclaration {
    /// CSS declaration block body
    pub fn to_css(&self) -> String {
        format!(
            "font-family: {}; font-size: {}; letter-spacing: {}; line-height: {}; writing-mode: {}; text-align: {};",
            self.font_family,
            self.font_size,
            self.letter_spacing,
            self.line_height,
            self.writing_mode,
            self.text_align
        )
    }
}
