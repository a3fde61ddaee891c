use assetfetch_e2e_tests::{
    DriveFile, files_asset_set, init_tracing, list_dir, spawn_drive_server, transport_config,
};
use assetfetch_lib::manifest::SourceLocator;
use assetfetch_lib::transport::DriveTransport;
use assetfetch_lib::{AssetFetcher, EnsureOutcome, FetchErrorKind};
use axum::body::Bytes;

fn drive(id: &str) -> SourceLocator {
    SourceLocator::GoogleDrive(id.to_string())
}

async fn drive_fetcher(files: Vec<(&str, DriveFile)>) -> AssetFetcher<DriveTransport> {
    let endpoint = spawn_drive_server(files)
        .await
        .expect("Failed to start Drive server");
    let transport = DriveTransport::from_config(&transport_config(Some(endpoint)))
        .expect("Failed to build Drive transport");
    AssetFetcher::new(transport)
}

#[tokio::test]
async fn test_direct_and_confirmed_downloads() {
    init_tracing();

    let fetcher = drive_fetcher(vec![
        ("small", DriveFile::Direct(Bytes::from_static(b"small model"))),
        (
            "large",
            DriveFile::BehindConfirmation(Bytes::from(vec![42u8; 512 * 1024])),
        ),
    ])
    .await;

    let temp = tempfile::tempdir().unwrap();
    let target = temp.path().join("models");
    let set = files_asset_set(
        "models",
        &target,
        &[("small.onnx", drive("small")), ("large.onnx", drive("large"))],
    );

    let outcome = fetcher.ensure(&set).await.expect("Drive fetch should succeed");

    assert!(matches!(outcome, EnsureOutcome::Fetched { .. }));
    assert_eq!(std::fs::read(target.join("small.onnx")).unwrap(), b"small model");
    let large = std::fs::read(target.join("large.onnx")).unwrap();
    assert_eq!(large.len(), 512 * 1024);
    assert!(large.iter().all(|b| *b == 42));
}

#[tokio::test]
async fn test_private_file_is_source_unavailable() {
    init_tracing();

    let fetcher = drive_fetcher(vec![("private", DriveFile::Forbidden)]).await;
    let temp = tempfile::tempdir().unwrap();
    let target = temp.path().join("models");
    let set = files_asset_set("models", &target, &[("w600k_r50.onnx", drive("private"))]);

    let err = fetcher.ensure(&set).await.expect_err("private file should fail");

    assert_eq!(err.kind(), FetchErrorKind::SourceUnavailable);
    assert_eq!(err.entry(), Some("w600k_r50.onnx"));
    assert!(list_dir(&target).is_empty());
}

#[tokio::test]
async fn test_quota_page_is_source_unavailable() {
    init_tracing();

    let fetcher = drive_fetcher(vec![
        ("ok", DriveFile::Direct(Bytes::from_static(b"ok"))),
        ("busy", DriveFile::QuotaExceeded),
        ("never", DriveFile::Direct(Bytes::from_static(b"never"))),
    ])
    .await;
    let temp = tempfile::tempdir().unwrap();
    let target = temp.path().join("models");
    let set = files_asset_set(
        "models",
        &target,
        &[
            ("ok.onnx", drive("ok")),
            ("busy.onnx", drive("busy")),
            ("never.onnx", drive("never")),
        ],
    );

    let err = fetcher.ensure(&set).await.expect_err("quota page should fail");

    assert_eq!(err.kind(), FetchErrorKind::SourceUnavailable);
    assert_eq!(err.entry(), Some("busy.onnx"));
    assert_eq!(list_dir(&target), vec!["ok.onnx"]);
}
