use super::error::FetchError;
use super::types::EnsureOutcome;
use crate::extract::extract_zip;
use crate::manifest::{AssetSet, AssetSource, ManifestEntry, SourceLocator};
use crate::transport::Transport;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

const STAGING_PREFIX: &str = ".assetfetch-";
const STAGING_SUFFIX: &str = ".part";

/// Makes sure an asset set is on disk, downloading it when it is not.
///
/// Entries are fetched strictly one after another, in manifest order. The
/// first failure aborts the run; files written before it stay in place.
#[derive(Debug, Clone)]
pub struct AssetFetcher<T> {
    transport: T,
}

impl<T: Transport> AssetFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn ensure(&self, asset_set: &AssetSet) -> Result<EnsureOutcome, FetchError> {
        let target_dir = &asset_set.target_dir;
        tracing::info!(asset_set = %asset_set.id, path = %target_dir.display(), "Checking");

        if is_present(asset_set).await? {
            tracing::info!(asset_set = %asset_set.id, path = %target_dir.display(), "Already present, skipping download");
            if asset_set.completion_marker.is_none() {
                tracing::debug!(
                    asset_set = %asset_set.id,
                    "Directory presence is the only completeness check; set completion_marker to detect interrupted downloads"
                );
            }
            return Ok(EnsureOutcome::AlreadyPresent);
        }

        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|e| FetchError::filesystem(target_dir, e))?;
        remove_stale_staging(target_dir).await?;

        let files = match &asset_set.source {
            AssetSource::Files(entries) => {
                let mut files = Vec::with_capacity(entries.len());
                for entry in entries {
                    files.push(self.fetch_entry(entry, target_dir).await?);
                }
                files
            }
            AssetSource::Archive(locator) => self.fetch_archive(asset_set, locator).await?,
        };

        if let Some(marker) = &asset_set.completion_marker {
            let marker_path = target_dir.join(marker);
            tokio::fs::write(&marker_path, format!("{}\n", asset_set.id))
                .await
                .map_err(|e| FetchError::filesystem(&marker_path, e))?;
        }

        tracing::info!(asset_set = %asset_set.id, files = files.len(), path = %target_dir.display(), "Done");
        Ok(EnsureOutcome::Fetched { files })
    }

    async fn fetch_entry(&self, entry: &ManifestEntry, target_dir: &Path) -> Result<PathBuf, FetchError> {
        let destination = target_dir.join(&entry.filename);
        tracing::info!(entry = %entry.filename, locator = %entry.locator, "Downloading");

        let (staging, bytes) = self
            .download(&entry.filename, &entry.locator, target_dir)
            .await?;
        staging
            .persist(&destination)
            .map_err(|e| FetchError::filesystem(&destination, e.error))?;

        tracing::debug!(path = %destination.display(), bytes, "Saved");
        Ok(destination)
    }

    async fn fetch_archive(
        &self,
        asset_set: &AssetSet,
        locator: &SourceLocator,
    ) -> Result<Vec<PathBuf>, FetchError> {
        let archive_name = asset_set.archive_name();
        let target_dir = asset_set.target_dir.clone();
        tracing::info!(entry = %archive_name, locator = %locator, "Downloading");

        let (staging, bytes) = self.download(&archive_name, locator, &target_dir).await?;
        tracing::info!(entry = %archive_name, bytes, "Extracting");

        let extract_target = target_dir.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            let result = extract_zip(staging.path(), &extract_target);
            // The temporary archive is removed here on every path.
            drop(staging);
            result
        })
        .await;

        let failure = |reason: String| FetchError::ExtractionFailure {
            archive: archive_name.clone(),
            target: target_dir.clone(),
            reason,
        };
        match extracted {
            Ok(Ok(files)) => Ok(files),
            Ok(Err(e)) => Err(failure(e.to_string())),
            Err(e) => Err(failure(e.to_string())),
        }
    }

    /// Streams one remote resource into a temporary file inside `dir`.
    ///
    /// The temporary file is deleted when dropped, so a failed transfer
    /// leaves nothing behind.
    async fn download(
        &self,
        entry: &str,
        locator: &SourceLocator,
        dir: &Path,
    ) -> Result<(NamedTempFile, u64), FetchError> {
        let mut stream = self
            .transport
            .fetch(locator)
            .await
            .map_err(|e| FetchError::from_transport(e, entry, locator))?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| FetchError::filesystem(dir, e))?;
        let file = staging
            .as_file()
            .try_clone()
            .map_err(|e| FetchError::filesystem(staging.path(), e))?;
        let mut writer = tokio::io::BufWriter::new(tokio::fs::File::from_std(file));

        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::from_transport(e, entry, locator))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::filesystem(staging.path(), e))?;
            written += chunk.len() as u64;
            tracing::trace!(entry = %entry, bytes = written, "Received");
        }
        writer
            .flush()
            .await
            .map_err(|e| FetchError::filesystem(staging.path(), e))?;
        drop(writer);

        Ok((staging, written))
    }
}

/// Deletes staging files left behind by a run that was killed mid-download.
async fn remove_stale_staging(dir: &Path) -> Result<(), FetchError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| FetchError::filesystem(dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FetchError::filesystem(dir, e))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !(name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX)) {
            continue;
        }
        let path = entry.path();
        tracing::debug!(path = %path.display(), "Removing stale staging file");
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| FetchError::filesystem(&path, e))?;
    }
    Ok(())
}

/// Decides whether `asset_set` is already on disk.
///
/// Without a completion marker, an existing directory counts as complete
/// even if an earlier run was interrupted halfway.
async fn is_present(asset_set: &AssetSet) -> Result<bool, FetchError> {
    let dir = &asset_set.target_dir;
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(FetchError::filesystem(dir, "exists but is not a directory"));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FetchError::filesystem(dir, e)),
    }

    let Some(marker) = &asset_set.completion_marker else {
        return Ok(true);
    };
    let marker_path = dir.join(marker);
    let present = tokio::fs::try_exists(&marker_path)
        .await
        .map_err(|e| FetchError::filesystem(&marker_path, e))?;
    if !present {
        tracing::info!(
            asset_set = %asset_set.id,
            marker = %marker_path.display(),
            "Completion marker missing, fetching again"
        );
    }
    Ok(present)
}
