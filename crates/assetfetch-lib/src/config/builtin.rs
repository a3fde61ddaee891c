use super::{Config, TransportConfig};
use crate::manifest::{AssetSet, AssetSource, SourceLocator};
use std::path::PathBuf;
use url::Url;

pub const BUFFALO_L_ID: &str = "buffalo_l";
pub const BUFFALO_L_URL: &str =
    "https://github.com/deepinsight/insightface/releases/download/v0.7/buffalo_l.zip";

/// Face detection/recognition bundle, laid out the way insightface expects
/// it under `root=buffalo_l`.
pub fn buffalo_l() -> AssetSet {
    AssetSet {
        id: BUFFALO_L_ID.to_string(),
        target_dir: PathBuf::from("buffalo_l/models/buffalo_l"),
        source: AssetSource::Archive(SourceLocator::Url(
            Url::parse(BUFFALO_L_URL).expect("built-in URL must parse"),
        )),
        completion_marker: None,
    }
}

impl Config {
    /// Configuration used when no config file is given.
    pub fn builtin() -> Self {
        Self {
            asset_sets: vec![buffalo_l()],
            transport: TransportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::validate_asset_sets;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = Config::builtin();
        assert_eq!(validate_asset_sets(&config.asset_sets), Ok(()));
        assert_eq!(
            config.asset_set(BUFFALO_L_ID).map(|s| s.archive_name()),
            Some("buffalo_l.zip".to_string())
        );
    }
}
