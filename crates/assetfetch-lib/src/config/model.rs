use crate::manifest::AssetSet;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub asset_sets: Vec<AssetSet>,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    #[serde(default = "default_google_drive_endpoint")]
    pub google_drive_endpoint: Url,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

pub const DEFAULT_GOOGLE_DRIVE_ENDPOINT: &str = "https://drive.google.com/uc";

fn default_google_drive_endpoint() -> Url {
    Url::parse(DEFAULT_GOOGLE_DRIVE_ENDPOINT).expect("default Drive endpoint must parse")
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            google_drive_endpoint: default_google_drive_endpoint(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Config {
    pub fn asset_set(&self, id: &str) -> Option<&AssetSet> {
        self.asset_sets.iter().find(|s| s.id == id)
    }
}
