use crate::cli::args::Command;
use crate::cli::params::EnsureParams;
use crate::config::{Config, load_config};
use crate::error::AssetFetchError;
use itertools::Itertools;

pub fn resolve_command(command: Command) -> Result<EnsureParams, AssetFetchError> {
    let Command {
        config_path,
        asset_sets,
    } = command;

    let mut app_config = match config_path {
        Some(config_path) => {
            tracing::info!("Loading configuration from {}", config_path);
            load_config(&config_path)?
        }
        None => Config::builtin(),
    };

    if !asset_sets.is_empty() {
        let unknown: Vec<&str> = asset_sets
            .iter()
            .map(String::as_str)
            .filter(|id| app_config.asset_set(id).is_none())
            .unique()
            .collect();
        if !unknown.is_empty() {
            return Err(AssetFetchError::CliArgumentValidation {
                details: format!(
                    "Unknown asset set(s): {}. Known asset sets: {}",
                    unknown.join(", "),
                    app_config.asset_sets.iter().map(|s| s.id.as_str()).join(", ")
                ),
            });
        }
        app_config
            .asset_sets
            .retain(|set| asset_sets.iter().any(|id| id == &set.id));
    }

    Ok(EnsureParams { app_config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BUFFALO_L_ID;

    #[test]
    fn test_defaults_to_builtin_config() {
        let params = resolve_command(Command {
            config_path: None,
            asset_sets: vec![],
        })
        .unwrap();
        assert_eq!(params.app_config, Config::builtin());
    }

    #[test]
    fn test_selects_known_asset_set() {
        let params = resolve_command(Command {
            config_path: None,
            asset_sets: vec![BUFFALO_L_ID.to_string(), BUFFALO_L_ID.to_string()],
        })
        .unwrap();
        assert_eq!(params.app_config.asset_sets.len(), 1);
    }

    #[test]
    fn test_unknown_asset_set_is_rejected() {
        let err = resolve_command(Command {
            config_path: None,
            asset_sets: vec!["antelopev2".to_string()],
        })
        .unwrap_err();
        match err {
            AssetFetchError::CliArgumentValidation { details } => {
                assert!(details.contains("antelopev2"));
                assert!(details.contains(BUFFALO_L_ID));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
