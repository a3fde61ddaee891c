use super::Config;
use crate::error::AssetFetchError;
use crate::manifest::validate_asset_sets;
use config::Config as ConfigBuilder;

/// Loads a configuration file (format picked from its extension), applies
/// `ASSETFETCH_*` environment overrides and validates every asset set.
pub fn load_config(config_path: &str) -> Result<Config, AssetFetchError> {
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path))
        .add_source(
            config::Environment::with_prefix("ASSETFETCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = config_builder.try_deserialize()?;
    validate_asset_sets(&config.asset_sets)?;
    Ok(config)
}
