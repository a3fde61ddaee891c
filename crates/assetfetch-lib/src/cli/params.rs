use crate::config::Config;

/// Everything `run_ensure` needs, with the asset sets already narrowed down
/// to the ones requested.
#[derive(Debug, Clone)]
pub struct EnsureParams {
    pub app_config: Config,
}
