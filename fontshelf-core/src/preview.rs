//! Preview session state
//!
//! Holds the current catalog, the picked base name and variant, and the
//! style parameters. `preview()` resolves the selection and computes what
//! the render target should show.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{requested_variant, resolve, Catalog, MatchStep, Resolution};
use crate::error::FontResult;
use crate::font::FontFile;
use crate::render::{PreviewStyle, RenderTarget, StyleDeclaration};

/// Label shown when nothing is selected
pub const DEFAULT_LABEL: &str = "default";

/// Everything needed to show one preview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    /// Resolved file, if any
    pub file: Option<FontFile>,
    /// Family name to register the file under (its stem)
    pub family: Option<String>,
    /// Current-font display label
    pub label: String,
    pub declaration: StyleDeclaration,
    pub writing_mode_label: String,
    pub text_align_label: String,
}

impl Preview {
    pub fn is_resolved(&self) -> bool {
        self.file.is_some()
    }
}

/// Picker state over one catalog
#[derive(Debug, Clone, Default)]
pub struct PreviewSession {
    catalog: Catalog,
    name: Option<String>,
    variant: Option<String>,
    pub style: PreviewStyle,
}

impl PreviewSession {
    /// Start a session with the first base name and its first option selected
    pub fn new(catalog: Catalog) -> Self {
        let mut session = Self {
            catalog,
            ..Default::default()
        };
        session.select_first();
        session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn selected_variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    fn select_first(&mut self) {
        let first = self.catalog.base_names().first().map(|n| n.to_string());
        match first {
            Some(name) => {
                self.select_name(&name);
            }
            None => {
                self.name = None;
                self.variant = None;
            }
        }
    }

    /// Pick a base name; the variant resets to that name's first option.
    /// Unknown names clear the selection and return false.
    pub fn select_name(&mut self, name: &str) -> bool {
        let first_option = match self.catalog.entry(name) {
            Some(entry) => entry.options().first().copied().flatten().map(String::from),
            None => {
                debug!("Base name '{}' is not in the catalog", name);
                self.name = None;
                self.variant = None;
                return false;
            }
        };

        self.name = Some(name.to_string());
        self.variant = first_option;
        true
    }

    /// Take a selection as requested (e.g. from a link or the command line)
    /// without snapping it to the catalog. Returns whether it resolves.
    pub fn select(&mut self, name: &str, variant: Option<&str>) -> bool {
        self.name = Some(name.to_string());
        self.variant = requested_variant(variant).map(String::from);
        self.resolution().is_some_and(|r| r.is_found())
    }

    /// Pick a variant of the selected name; `None` picks the unnumbered file
    pub fn select_variant(&mut self, variant: Option<&str>) -> bool {
        let known = self
            .name
            .as_deref()
            .and_then(|name| self.catalog.entry(name))
            .is_some_and(|entry| entry.contains(variant));

        if known {
            self.variant = variant.map(String::from);
        }
        known
    }

    /// Number picker options for the selected name
    pub fn number_options(&self) -> Vec<Option<String>> {
        self.name
            .as_deref()
            .map(|name| {
                self.catalog
                    .numbers_for(name)
                    .into_iter()
                    .map(|v| v.map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Swap in a rebuilt catalog, keeping the selection when it still exists
    pub fn refresh(&mut self, catalog: Catalog) {
        self.catalog = catalog;

        let Some(name) = self.name.clone() else {
            self.select_first();
            return;
        };

        let Some(entry) = self.catalog.entry(&name) else {
            debug!("Selected base name '{}' disappeared; resetting", name);
            self.select_first();
            return;
        };

        if !entry.contains(self.variant.as_deref()) {
            self.select_name(&name);
        }
    }

    fn resolution(&self) -> Option<Resolution<'_>> {
        let name = self.name.as_deref()?;

        // The unnumbered option means that exact file, not any file of the name
        if self.variant.is_none() {
            if let Some(found) = self
                .catalog
                .files()
                .iter()
                .find(|f| f.parsed.base_name == name && f.parsed.variant.is_none())
            {
                return Some(Resolution::Found {
                    file: &found.file,
                    step: MatchStep::BaseName,
                });
            }
        }

        Some(resolve(&self.catalog, name, self.variant.as_deref()))
    }

    /// Resolve the selection and compute the preview
    pub fn preview(&self) -> Preview {
        let (file, label) = match self.resolution() {
            Some(resolution) => (resolution.file().cloned(), resolution.display_label()),
            None => (None, DEFAULT_LABEL.to_string()),
        };

        let family = file.as_ref().map(|f| f.stem().to_string());
        let declaration = self.style.declaration(family.as_deref());

        Preview {
            file,
            family,
            label,
            declaration,
            writing_mode_label: self.style.writing_mode.label().to_string(),
            text_align_label: self
                .style
                .text_align
                .label(self.style.writing_mode)
                .to_string(),
        }
    }

    /// Apply the current preview's style to a render target
    pub async fn apply_to(&self, target: &dyn RenderTarget) -> FontResult<Preview> {
        let preview = self.preview();
        target.apply_style(&preview.declaration).await?;
        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NOT_FOUND_LABEL;
    use crate::font::SourceOrigin;
    use crate::render::{TextAlign, WritingMode};
    use pretty_assertions::assert_eq;

    fn catalog(names: &[&str]) -> Catalog {
        let files: Vec<FontFile> = names
            .iter()
            .map(|n| FontFile::new(*n, 1, SourceOrigin::Local))
            .collect();
        Catalog::build(&files)
    }

    #[test]
    fn test_initial_selection() {
        let session = PreviewSession::new(catalog(&[
            "YAMADA_02.woff2",
            "SATO_02.woff2",
            "SATO_01.woff2",
        ]));
        assert_eq!(session.selected_name(), Some("SATO"));
        assert_eq!(session.selected_variant(), Some("01"));

        let preview = session.preview();
        assert_eq!(preview.label, "SATO_01");
        assert_eq!(preview.declaration.font_family, "\"SATO_01\"");
    }

    #[test]
    fn test_empty_catalog_uses_default() {
        let session = PreviewSession::new(Catalog::new());
        let preview = session.preview();
        assert!(!preview.is_resolved());
        assert_eq!(preview.label, DEFAULT_LABEL);
        assert_eq!(preview.declaration.font_family, "sans-serif");
        assert!(session.number_options().is_empty());
    }

    #[test]
    fn test_changing_name_rebuilds_numbers() {
        let mut session = PreviewSession::new(catalog(&[
            "SATO_01.woff2",
            "YAMADA_03.woff2",
            "YAMADA_1.woff2",
        ]));
        assert!(session.select_name("YAMADA"));
        assert_eq!(
            session.number_options(),
            vec![Some("1".to_string()), Some("03".to_string())]
        );
        assert_eq!(session.selected_variant(), Some("1"));

        assert!(session.select_variant(Some("03")));
        assert!(!session.select_variant(Some("99")));
        assert_eq!(session.selected_variant(), Some("03"));
    }

    #[test]
    fn test_unnumbered_option() {
        let mut session = PreviewSession::new(catalog(&["SATO.woff2", "SATO_01.woff2"]));
        assert_eq!(
            session.number_options(),
            vec![Some("01".to_string()), None]
        );

        assert!(session.select_variant(None));
        assert_eq!(session.preview().label, "SATO");
    }

    #[test]
    fn test_refresh_keeps_selection() {
        let mut session = PreviewSession::new(catalog(&["SATO_01.woff2", "SATO_02.woff2"]));
        session.select_variant(Some("02"));

        session.refresh(catalog(&["AOKI_1.ttf", "SATO_01.woff2", "SATO_02.woff2"]));
        assert_eq!(session.selected_name(), Some("SATO"));
        assert_eq!(session.selected_variant(), Some("02"));
    }

    #[test]
    fn test_refresh_after_delete() {
        let mut session = PreviewSession::new(catalog(&["SATO_01.woff2", "SATO_02.woff2"]));
        session.select_variant(Some("02"));

        session.refresh(catalog(&["SATO_01.woff2"]));
        assert_eq!(session.selected_variant(), Some("01"));

        session.refresh(catalog(&["AOKI_1.ttf"]));
        assert_eq!(session.selected_name(), Some("AOKI"));

        session.refresh(Catalog::new());
        assert_eq!(session.selected_name(), None);
        assert_eq!(session.preview().label, DEFAULT_LABEL);
    }

    #[test]
    fn test_unknown_name_is_not_found_label() {
        let mut session = PreviewSession::new(catalog(&["SATO_01.woff2"]));
        assert!(!session.select("SATO", Some("99")));
        let preview = session.preview();
        assert_eq!(preview.label, NOT_FOUND_LABEL);
        assert_eq!(preview.declaration.font_family, "sans-serif");

        assert!(!session.select("NOBODY", None));
        assert_eq!(session.preview().label, NOT_FOUND_LABEL);

        assert!(session.select("SATO", Some("none")));
        assert_eq!(session.selected_variant(), None);
        assert_eq!(session.preview().label, "SATO_01");
    }

    #[test]
    fn test_style_flows_into_preview() {
        let mut session = PreviewSession::new(catalog(&["SATO_01.woff2"]));
        session.style.set_size_px(300);
        session.style.writing_mode = WritingMode::VerticalRl;
        session.style.text_align = TextAlign::Center;

        let preview = session.preview();
        assert_eq!(preview.declaration.font_size, "200px");
        assert_eq!(preview.declaration.text_align, "center");
        assert_eq!(preview.writing_mode_label, "vertical");
        assert_eq!(preview.text_align_label, "center");
    }
}
