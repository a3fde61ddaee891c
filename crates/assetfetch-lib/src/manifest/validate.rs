use super::model::{AssetSet, AssetSource, ManifestEntry, SourceLocator};
use itertools::Itertools;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Asset set id must not be empty")]
    EmptyId,

    #[error("Asset set {asset_set} has an empty manifest")]
    EmptyManifest { asset_set: String },

    #[error("Asset set {asset_set} lists {filename} more than once")]
    DuplicateFilename { asset_set: String, filename: String },

    #[error("Asset set {asset_set} has an invalid file name {filename:?}: {reason}")]
    InvalidFilename {
        asset_set: String,
        filename: String,
        reason: String,
    },

    #[error("Asset set {asset_set} has an invalid source {locator}: {reason}")]
    InvalidLocator {
        asset_set: String,
        locator: String,
        reason: String,
    },

    #[error("Asset set id {asset_set} is defined more than once")]
    DuplicateAssetSet { asset_set: String },

    #[error("No asset sets defined")]
    NoAssetSets,
}

/// Checks that `name` is a single, ordinary path component.
pub fn check_plain_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("file name is empty".to_string());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(()),
        _ => Err("must be a plain file name without directories".to_string()),
    }
}

fn check_locator(asset_set: &str, locator: &SourceLocator) -> Result<(), ManifestError> {
    let invalid = |reason: &str| ManifestError::InvalidLocator {
        asset_set: asset_set.to_string(),
        locator: locator.to_string(),
        reason: reason.to_string(),
    };

    match locator {
        SourceLocator::Url(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid("only http and https URLs are supported"));
            }
            if url.host_str().is_none() {
                return Err(invalid("URL has no host"));
            }
            if url.query().is_some() {
                return Err(invalid("query strings are not supported"));
            }
            if url.path().ends_with('/') {
                return Err(invalid("URL must point at a file"));
            }
        }
        SourceLocator::GoogleDrive(id) => {
            if id.trim().is_empty() {
                return Err(invalid("Google Drive file id is empty"));
            }
        }
    }
    Ok(())
}

fn check_entry(asset_set: &str, entry: &ManifestEntry) -> Result<(), ManifestError> {
    check_plain_filename(&entry.filename).map_err(|reason| ManifestError::InvalidFilename {
        asset_set: asset_set.to_string(),
        filename: entry.filename.clone(),
        reason,
    })?;
    check_locator(asset_set, &entry.locator)
}

impl AssetSet {
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.id.trim().is_empty() {
            return Err(ManifestError::EmptyId);
        }

        match &self.source {
            AssetSource::Files(entries) => {
                if entries.is_empty() {
                    return Err(ManifestError::EmptyManifest {
                        asset_set: self.id.clone(),
                    });
                }
                for entry in entries {
                    check_entry(&self.id, entry)?;
                }
                if let Some(filename) = entries.iter().map(|e| e.filename.as_str()).duplicates().next() {
                    return Err(ManifestError::DuplicateFilename {
                        asset_set: self.id.clone(),
                        filename: filename.to_string(),
                    });
                }
            }
            AssetSource::Archive(locator) => check_locator(&self.id, locator)?,
        }

        if let Some(marker) = &self.completion_marker {
            check_plain_filename(marker).map_err(|reason| ManifestError::InvalidFilename {
                asset_set: self.id.clone(),
                filename: marker.clone(),
                reason,
            })?;
            if self.entries().iter().any(|e| &e.filename == marker) {
                return Err(ManifestError::InvalidFilename {
                    asset_set: self.id.clone(),
                    filename: marker.clone(),
                    reason: "completion marker collides with a manifest file".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Validates every asset set and checks that ids are unique.
pub fn validate_asset_sets(asset_sets: &[AssetSet]) -> Result<(), ManifestError> {
    if asset_sets.is_empty() {
        return Err(ManifestError::NoAssetSets);
    }
    for asset_set in asset_sets {
        asset_set.validate()?;
    }
    if let Some(id) = asset_sets.iter().map(|s| s.id.as_str()).duplicates().next() {
        return Err(ManifestError::DuplicateAssetSet {
            asset_set: id.to_string(),
        });
    }
    Ok(())
}
