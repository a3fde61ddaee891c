mod model;
mod validate;

pub use model::{AssetSet, AssetSource, ManifestEntry, SourceLocator};
pub use validate::{ManifestError, check_plain_filename, validate_asset_sets};
