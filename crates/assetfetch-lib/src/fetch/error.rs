use crate::transport::TransportError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchErrorKind {
    TransportFailure,
    SourceUnavailable,
    FilesystemFailure,
    ExtractionFailure,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::TransportFailure => "transport failure",
            FetchErrorKind::SourceUnavailable => "source unavailable",
            FetchErrorKind::FilesystemFailure => "filesystem failure",
            FetchErrorKind::ExtractionFailure => "extraction failure",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to download {entry} from {locator}: {reason}")]
    TransportFailure {
        entry: String,
        locator: String,
        reason: String,
    },

    #[error("Source {locator} for {entry} is unavailable: {reason}")]
    SourceUnavailable {
        entry: String,
        locator: String,
        reason: String,
    },

    #[error("Filesystem operation failed at {path}: {reason}")]
    FilesystemFailure { path: PathBuf, reason: String },

    #[error("Failed to extract archive {archive} into {target}: {reason}")]
    ExtractionFailure {
        archive: String,
        target: PathBuf,
        reason: String,
    },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::TransportFailure { .. } => FetchErrorKind::TransportFailure,
            FetchError::SourceUnavailable { .. } => FetchErrorKind::SourceUnavailable,
            FetchError::FilesystemFailure { .. } => FetchErrorKind::FilesystemFailure,
            FetchError::ExtractionFailure { .. } => FetchErrorKind::ExtractionFailure,
        }
    }

    /// Manifest entry (or archive name) the failure belongs to, if any.
    pub fn entry(&self) -> Option<&str> {
        match self {
            FetchError::TransportFailure { entry, .. }
            | FetchError::SourceUnavailable { entry, .. } => Some(entry),
            FetchError::ExtractionFailure { archive, .. } => Some(archive),
            FetchError::FilesystemFailure { .. } => None,
        }
    }

    pub(crate) fn from_transport(
        err: TransportError,
        entry: &str,
        locator: &impl fmt::Display,
    ) -> Self {
        match err {
            TransportError::Unavailable { reason } => FetchError::SourceUnavailable {
                entry: entry.to_string(),
                locator: locator.to_string(),
                reason,
            },
            TransportError::Failed { reason } => FetchError::TransportFailure {
                entry: entry.to_string(),
                locator: locator.to_string(),
                reason,
            },
        }
    }

    pub(crate) fn filesystem(path: &Path, err: impl fmt::Display) -> Self {
        FetchError::FilesystemFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}
