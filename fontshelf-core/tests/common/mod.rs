//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

#![allow(dead_code)]

use fontshelf_core::font::{FontFile, SourceOrigin};
use std::path::Path;
use std::sync::Once;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// File names from a real handwriting font folder
pub const SAMPLE_FONTS: [&str; 8] = [
    "YAMADA_01.woff2",
    "YAMADA_02.woff2",
    "SATO_01.woff2",
    "SATO_02.woff2",
    "font_6.woff2",
    "my_handwritten_font_446737.woff2",
    "my_handwritten_font80.woff2",
    "my_handwritten_font76.woff2",
];

/// Local descriptors for a list of names
pub fn local_files(names: &[&str]) -> Vec<FontFile> {
    names
        .iter()
        .map(|n| FontFile::new(*n, 1, SourceOrigin::Local))
        .collect()
}

/// Write small placeholder font files into `dir`
pub fn write_fonts(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}
