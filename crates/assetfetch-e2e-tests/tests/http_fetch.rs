use assert_fs::prelude::*;
use assetfetch_e2e_tests::{
    Served, files_asset_set, http_locator, init_tracing, list_dir, spawn_file_server,
    spawn_http_server, unused_addr, zip_bytes,
};
use assetfetch_lib::manifest::{AssetSet, AssetSource};
use assetfetch_lib::transport::HttpTransport;
use assetfetch_lib::{AssetFetcher, EnsureOutcome, FetchErrorKind};
use axum::body::Bytes;
use axum::http::StatusCode;
use predicates::prelude::*;

#[tokio::test]
async fn test_fetches_files_over_http_in_order() {
    init_tracing();

    let addr = spawn_file_server(vec![
        ("/models/a.bin", Bytes::from_static(b"alpha")),
        ("/models/b.bin", Bytes::from(vec![7u8; 256 * 1024])),
    ])
    .await
    .expect("Failed to start file server");

    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("cache/models");
    let set = files_asset_set(
        "models",
        target.path(),
        &[
            ("a.bin", http_locator(addr, "/models/a.bin")),
            ("b.bin", http_locator(addr, "/models/b.bin")),
        ],
    );

    let fetcher = AssetFetcher::new(HttpTransport::new());
    let outcome = fetcher.ensure(&set).await.expect("ensure should succeed");

    assert_eq!(
        outcome,
        EnsureOutcome::Fetched {
            files: vec![target.path().join("a.bin"), target.path().join("b.bin")]
        }
    );
    target.child("a.bin").assert("alpha");
    assert_eq!(
        std::fs::metadata(target.path().join("b.bin")).unwrap().len(),
        256 * 1024
    );
    assert_eq!(list_dir(target.path()), vec!["a.bin", "b.bin"]);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    init_tracing();

    let addr = spawn_file_server(vec![("/a.bin", Bytes::from_static(b"alpha"))])
        .await
        .expect("Failed to start file server");
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("models");
    let set = files_asset_set("models", target.path(), &[("a.bin", http_locator(addr, "/a.bin"))]);
    let fetcher = AssetFetcher::new(HttpTransport::new());

    fetcher.ensure(&set).await.expect("first run should succeed");
    std::fs::write(target.path().join("a.bin"), b"locally modified").unwrap();

    let outcome = fetcher.ensure(&set).await.expect("second run should succeed");
    assert_eq!(outcome, EnsureOutcome::AlreadyPresent);
    target.child("a.bin").assert("locally modified");
}

#[tokio::test]
async fn test_missing_remote_file_is_source_unavailable() {
    init_tracing();

    let addr = spawn_file_server(vec![("/a.bin", Bytes::from_static(b"alpha"))])
        .await
        .expect("Failed to start file server");
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("models");
    let set = files_asset_set(
        "models",
        target.path(),
        &[
            ("a.bin", http_locator(addr, "/a.bin")),
            ("gone.bin", http_locator(addr, "/gone.bin")),
        ],
    );

    let err = AssetFetcher::new(HttpTransport::new())
        .ensure(&set)
        .await
        .expect_err("missing file should fail");

    assert_eq!(err.kind(), FetchErrorKind::SourceUnavailable);
    assert_eq!(err.entry(), Some("gone.bin"));
    assert_eq!(list_dir(target.path()), vec!["a.bin"]);
}

#[tokio::test]
async fn test_refused_remote_files_are_source_unavailable() {
    init_tracing();

    for status in [StatusCode::FORBIDDEN, StatusCode::NOT_FOUND] {
        let addr = spawn_http_server(vec![
            ("/a.bin", Served::Body(Bytes::from_static(b"alpha"))),
            ("/private.bin", Served::Status(status)),
            ("/c.bin", Served::Body(Bytes::from_static(b"charlie"))),
        ])
        .await
        .expect("Failed to start file server");
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("models");
        let set = files_asset_set(
            "models",
            target.path(),
            &[
                ("a.bin", http_locator(addr, "/a.bin")),
                ("private.bin", http_locator(addr, "/private.bin")),
                ("c.bin", http_locator(addr, "/c.bin")),
            ],
        );

        let err = AssetFetcher::new(HttpTransport::new())
            .ensure(&set)
            .await
            .expect_err("refused file should fail");

        assert_eq!(err.kind(), FetchErrorKind::SourceUnavailable, "status {status}");
        assert_eq!(err.entry(), Some("private.bin"));
        target.child("a.bin").assert("alpha");
        assert_eq!(list_dir(target.path()), vec!["a.bin"]);
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transport_failure() {
    init_tracing();

    let addr = unused_addr().await.expect("Failed to reserve an address");
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("cache/models");
    let set = files_asset_set(
        "models",
        target.path(),
        &[
            ("a.bin", http_locator(addr, "/a.bin")),
            ("b.bin", http_locator(addr, "/b.bin")),
        ],
    );

    let err = AssetFetcher::new(HttpTransport::new())
        .ensure(&set)
        .await
        .expect_err("unreachable host should fail");

    assert_eq!(err.kind(), FetchErrorKind::TransportFailure);
    assert_eq!(err.entry(), Some("a.bin"));
    target.assert(predicate::path::is_dir());
    assert!(list_dir(target.path()).is_empty());
}

#[tokio::test]
async fn test_archive_over_http_is_extracted() {
    init_tracing();

    let archive = zip_bytes(&[
        ("1k3d68.onnx", "landmark 3d"),
        ("2d106det.onnx", "landmark 2d"),
        ("det_10g.onnx", "detection"),
        ("genderage.onnx", "attributes"),
        ("w600k_r50.onnx", "recognition"),
    ]);
    let addr = spawn_file_server(vec![("/v0.7/buffalo_l.zip", archive)])
        .await
        .expect("Failed to start file server");

    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("buffalo_l/models/buffalo_l");
    let set = AssetSet {
        id: "buffalo_l".to_string(),
        target_dir: target.path().to_path_buf(),
        source: AssetSource::Archive(http_locator(addr, "/v0.7/buffalo_l.zip")),
        completion_marker: Some(".complete".to_string()),
    };

    let outcome = AssetFetcher::new(HttpTransport::new())
        .ensure(&set)
        .await
        .expect("archive fetch should succeed");

    assert!(matches!(outcome, EnsureOutcome::Fetched { ref files } if files.len() == 5));
    assert_eq!(
        list_dir(target.path()),
        vec![
            ".complete",
            "1k3d68.onnx",
            "2d106det.onnx",
            "det_10g.onnx",
            "genderage.onnx",
            "w600k_r50.onnx"
        ]
    );
    target.child("det_10g.onnx").assert("detection");
}
