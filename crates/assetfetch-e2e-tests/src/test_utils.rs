use assetfetch_lib::config::{Config, TransportConfig};
use assetfetch_lib::manifest::{AssetSet, AssetSource, ManifestEntry, SourceLocator};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use eyre::Result;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use url::Url;
use zip::write::{FileOptions, ZipWriter};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("assetfetch_lib=debug,assetfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}

async fn serve(app: Router) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(addr)
}

/// What the local file server answers for one path.
#[derive(Debug, Clone)]
pub enum Served {
    Body(Bytes),
    Status(StatusCode),
}

async fn serve_static(State(files): State<Arc<HashMap<String, Served>>>, uri: Uri) -> Response {
    match files.get(uri.path()) {
        Some(Served::Body(data)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (header::CONTENT_LENGTH, data.len().to_string()),
            ],
            data.clone(),
        )
            .into_response(),
        Some(Served::Status(status)) => (*status).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves `files` (path → body) over plain HTTP; anything else is a 404.
pub async fn spawn_file_server(files: Vec<(&str, Bytes)>) -> Result<SocketAddr> {
    spawn_http_server(
        files
            .into_iter()
            .map(|(path, data)| (path, Served::Body(data)))
            .collect(),
    )
    .await
}

/// Like [`spawn_file_server`], but paths may also answer with a bare status.
pub async fn spawn_http_server(routes: Vec<(&str, Served)>) -> Result<SocketAddr> {
    let routes: HashMap<String, Served> = routes
        .into_iter()
        .map(|(path, served)| (path.to_string(), served))
        .collect();
    let app = Router::new()
        .fallback(serve_static)
        .with_state(Arc::new(routes));
    serve(app).await
}

/// How the fake Drive endpoint answers for one file id.
#[derive(Debug, Clone)]
pub enum DriveFile {
    /// Served straight away.
    Direct(Bytes),
    /// Served only after following the virus-scan confirmation form.
    BehindConfirmation(Bytes),
    /// Private file.
    Forbidden,
    /// Answers with an HTML page that offers no way to download.
    QuotaExceeded,
}

const CONFIRM_UUID: &str = "5f1c-4d2e";

fn confirmation_page(id: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Google Drive - Virus scan warning</title></head><body>
<p class="uc-warning-subcaption">Google Drive can't scan this file for viruses.</p>
<form id="download-form" action="/download" method="get">
<input type="submit" id="uc-download-link" value="Download anyway"/>
<input type="hidden" name="id" value="{id}">
<input type="hidden" name="export" value="download">
<input type="hidden" name="confirm" value="t">
<input type="hidden" name="uuid" value="{CONFIRM_UUID}">
</form></body></html>"#
    )
}

fn octet_stream(data: &Bytes) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data.clone(),
    )
        .into_response()
}

async fn drive_uc(
    State(files): State<Arc<HashMap<String, DriveFile>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(file) = params.get("id").and_then(|id| files.get(id)) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match file {
        DriveFile::Direct(data) => octet_stream(data),
        DriveFile::BehindConfirmation(_) => Html(confirmation_page(&params["id"])).into_response(),
        DriveFile::Forbidden => StatusCode::FORBIDDEN.into_response(),
        DriveFile::QuotaExceeded => Html(
            "<html><body><p>Too many users have viewed or downloaded this file recently.</p></body></html>",
        )
        .into_response(),
    }
}

async fn drive_download(
    State(files): State<Arc<HashMap<String, DriveFile>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let confirmed = params.get("confirm").map(String::as_str) == Some("t")
        && params.get("uuid").map(String::as_str) == Some(CONFIRM_UUID);
    match params.get("id").and_then(|id| files.get(id)) {
        Some(DriveFile::BehindConfirmation(data)) if confirmed => octet_stream(data),
        Some(DriveFile::BehindConfirmation(_)) => StatusCode::FORBIDDEN.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Emulates the Drive download endpoint at `/uc`; returns its URL.
pub async fn spawn_drive_server(files: Vec<(&str, DriveFile)>) -> Result<Url> {
    let files: HashMap<String, DriveFile> = files
        .into_iter()
        .map(|(id, file)| (id.to_string(), file))
        .collect();
    let app = Router::new()
        .route("/uc", get(drive_uc))
        .route("/download", get(drive_download))
        .with_state(Arc::new(files));
    let addr = serve(app).await?;
    Ok(Url::parse(&format!("http://{addr}/uc"))?)
}

/// An address nothing listens on.
pub async fn unused_addr() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

pub fn http_locator(addr: SocketAddr, path: &str) -> SourceLocator {
    SourceLocator::Url(Url::parse(&format!("http://{addr}{path}")).expect("valid test URL"))
}

pub fn zip_bytes(entries: &[(&str, &str)]) -> Bytes {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("start zip entry");
        writer
            .write_all(data.as_bytes())
            .expect("write zip entry");
    }
    Bytes::from(writer.finish().expect("finish zip").into_inner())
}

pub fn files_asset_set(id: &str, target_dir: &Path, entries: &[(&str, SourceLocator)]) -> AssetSet {
    AssetSet {
        id: id.to_string(),
        target_dir: target_dir.to_path_buf(),
        source: AssetSource::Files(
            entries
                .iter()
                .map(|(filename, locator)| ManifestEntry {
                    filename: filename.to_string(),
                    locator: locator.clone(),
                })
                .collect(),
        ),
        completion_marker: None,
    }
}

pub fn transport_config(drive_endpoint: Option<Url>) -> TransportConfig {
    let mut config = TransportConfig {
        connect_timeout_secs: 5,
        ..TransportConfig::default()
    };
    if let Some(endpoint) = drive_endpoint {
        config.google_drive_endpoint = endpoint;
    }
    config
}

/// Writes `config` as JSON into a fresh temporary directory.
pub fn setup_test_environment(config: &Config) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join("assetfetch.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(config)?)?;
    Ok((temp_dir, config_path))
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
