use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Unpacks every entry of the zip archive at `archive` below `target_dir`.
///
/// Entries whose names would land outside `target_dir` are skipped. Returns
/// the files written, in archive order.
pub fn extract_zip(archive: &Path, target_dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let file = File::open(archive).map_err(|source| ExtractError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file)?;
    let mut written = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;

        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            tracing::warn!(entry = %entry.name(), "Skipping archive entry outside the target directory");
            continue;
        };
        let out_path = target_dir.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| ExtractError::Write {
                path: out_path.clone(),
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ExtractError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out_file = File::create(&out_path).map_err(|source| ExtractError::Write {
            path: out_path.clone(),
            source,
        })?;
        let bytes = std::io::copy(&mut entry, &mut out_file).map_err(|source| ExtractError::Write {
            path: out_path.clone(),
            source,
        })?;
        tracing::debug!(path = %out_path.display(), bytes, "Extracted");
        written.push(out_path);
    }

    Ok(written)
}
