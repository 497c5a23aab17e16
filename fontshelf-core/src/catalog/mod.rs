//! Font catalog - name parsing, grouping and selection
//!
//! Turns a flat list of font file names into a picker-friendly catalog of
//! base names and numbered variants, and resolves a picker selection back
//! to a concrete file.
//!
//! # Overview
//!
//! ```text
//! listings (disk, memory, remote, cache)
//!     │  merge_listings: first file per name wins
//!     ▼
//! Catalog::build  ── name::parse ──► { baseName, variant }
//!     │
//!     ▼
//! resolve(catalog, baseName, variant) ──► Found(FontFile) | NotFound
//! ```

mod builder;
pub mod name;
mod resolver;

pub use builder::{compare_variants, merge_listings, Catalog, CatalogEntry, CatalogFile, CatalogItem};
pub use name::{parse, NamePattern, ParsedName};
pub use resolver::{
    requested_variant, resolve, resolve_literal, MatchStep, Resolution, FALLBACK_FAMILY,
    NOT_FOUND_LABEL, NO_VARIANT,
};
