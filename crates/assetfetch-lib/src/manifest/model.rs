use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Where the bytes of a single remote resource come from.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub enum SourceLocator {
    /// Plain HTTP(S) download.
    Url(Url),
    /// Google Drive file identifier.
    GoogleDrive(String),
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::Url(url) => write!(f, "{url}"),
            SourceLocator::GoogleDrive(id) => write!(f, "gdrive:{id}"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// File name inside the target directory
    pub filename: String,
    /// Remote resource the file is fetched from
    pub locator: SourceLocator,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub enum AssetSource {
    /// Discrete files, fetched one after another in manifest order.
    Files(Vec<ManifestEntry>),
    /// A single zip archive unpacked into the target directory.
    Archive(SourceLocator),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssetSet {
    pub id: String,
    pub target_dir: PathBuf,
    pub source: AssetSource,
    /// When set, the asset set only counts as present once this file exists
    /// inside `target_dir`. Without it, the directory itself is the marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_marker: Option<String>,
}

impl AssetSet {
    /// Name used in logs and errors for the archive of an archive-backed set.
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.id)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        match &self.source {
            AssetSource::Files(entries) => entries,
            AssetSource::Archive(_) => &[],
        }
    }
}
