use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error("{0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("Invalid arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
