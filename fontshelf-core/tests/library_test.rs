//! End-to-end tests over real storage backends

mod common;

use common::{init_test_logging, write_fonts, SAMPLE_FONTS};
use fontshelf_core::catalog::{resolve, Resolution};
use fontshelf_core::library::FontLibrary;
use fontshelf_core::preview::PreviewSession;
use fontshelf_core::render::CssRenderTarget;
use fontshelf_core::storage::{
    self, DirectoryStorage, FontStorage, LayeredStorage, MemoryStorage, StorageKind, UploadFile,
};
use fontshelf_core::FontError;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_ttf_upload_lands_on_disk() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let fonts_dir = temp_dir.path().join("fonts");
    let library = FontLibrary::new(Arc::new(DirectoryStorage::new(&fonts_dir)));

    let stored = library
        .upload(vec![UploadFile::new("AOKI_1.ttf", vec![0, 1, 0, 0])])
        .await
        .unwrap();

    assert_eq!(stored[0].name, "AOKI_1.ttf");
    assert_eq!(std::fs::read(fonts_dir.join("AOKI_1.ttf")).unwrap(), vec![0, 1, 0, 0]);

    let catalog = library.catalog().await;
    assert_eq!(catalog.base_names(), vec!["AOKI"]);
}

#[tokio::test]
async fn test_png_rejected_before_any_write() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let fonts_dir = temp_dir.path().join("fonts");
    let library = FontLibrary::new(Arc::new(DirectoryStorage::new(&fonts_dir)));

    let err = library
        .upload(vec![
            UploadFile::new("AOKI_1.ttf", vec![1]),
            UploadFile::new("logo.png", vec![1]),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, FontError::MalformedUpload { ref name, .. } if name == "logo.png"));
    assert!(!fonts_dir.exists());
    assert!(library.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_removes_from_list_and_resolve() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let fonts_dir = temp_dir.path().join("fonts");
    write_fonts(&fonts_dir, &SAMPLE_FONTS);
    let library = FontLibrary::new(Arc::new(DirectoryStorage::new(&fonts_dir)));

    let before = library.catalog().await;
    assert!(resolve(&before, "SATO", Some("02")).is_found());

    library.delete("SATO_02.woff2").await.unwrap();

    let names: Vec<String> = library
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert!(!names.contains(&"SATO_02.woff2".to_string()));

    let after = library.catalog().await;
    assert_eq!(resolve(&after, "SATO", Some("02")), Resolution::NotFound);
    assert_eq!(after.numbers_for("SATO"), vec![Some("01")]);
}

#[tokio::test]
async fn test_layered_storage_dedups_by_name() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let fonts_dir = temp_dir.path().join("fonts");
    write_fonts(&fonts_dir, &["SATO_01.woff2"]);

    let mirror = Arc::new(MemoryStorage::new());
    mirror.put("SATO_01.woff2", vec![9]).await.unwrap();
    mirror.put("YAMADA_01.woff2", vec![9]).await.unwrap();

    let layered = LayeredStorage::new(Arc::new(DirectoryStorage::new(&fonts_dir)), mirror);
    let names: Vec<String> = layered
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["SATO_01.woff2", "YAMADA_01.woff2"]);

    // Disk copy shadows the mirror copy
    assert_eq!(layered.get("SATO_01.woff2").await.unwrap(), b"SATO_01.woff2".to_vec());
}

#[tokio::test]
async fn test_open_picks_backend() {
    let temp_dir = TempDir::new().unwrap();
    for (kind, expected) in [
        (StorageKind::Filesystem, "filesystem"),
        (StorageKind::Memory, "memory"),
        (StorageKind::Layered, "layered"),
    ] {
        let backend = storage::open(kind, temp_dir.path());
        assert_eq!(backend.name(), expected);
        assert!(backend.list().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_preview_end_to_end() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let fonts_dir = temp_dir.path().join("fonts");
    write_fonts(&fonts_dir, &SAMPLE_FONTS);
    let library = FontLibrary::new(Arc::new(DirectoryStorage::new(&fonts_dir)));

    let catalog = library.catalog().await;
    let target = CssRenderTarget::new(temp_dir.path().join("assets"), "assets/");
    assert_eq!(
        library.register_catalog(&catalog, &target).await,
        SAMPLE_FONTS.len()
    );

    let mut session = PreviewSession::new(catalog);
    assert_eq!(session.selected_name(), Some("SATO"));
    assert!(session.select_name("YAMADA"));
    assert!(session.select_variant(Some("02")));

    let preview = session.apply_to(&target).await.unwrap();
    assert_eq!(preview.label, "YAMADA_02");

    let css = target.stylesheet().await;
    assert!(css.contains("src: url('assets/YAMADA_02.woff2') format('woff2');"));
    assert!(css.contains(".preview-text { font-family: \"YAMADA_02\";"));
}
