pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod manifest;
pub mod transport;

pub use config::Config;
pub use error::AssetFetchError;
pub use fetch::{AssetFetcher, EnsureOutcome, FetchError, FetchErrorKind};
pub use manifest::{AssetSet, AssetSource, ManifestEntry, SourceLocator};
