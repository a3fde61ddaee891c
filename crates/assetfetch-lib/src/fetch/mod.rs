mod error;
mod fetcher;
mod types;

pub use error::{FetchError, FetchErrorKind};
pub use fetcher::AssetFetcher;
pub use types::EnsureOutcome;
