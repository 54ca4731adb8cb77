use super::super::{GatewayConfig, ObservabilityConfig, PipelineConfig};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(super) const CONFIG_DIR_NAME: &str = ".nutrilens";
pub(super) const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - resolved at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

pub(super) fn default_config_dir() -> PathBuf {
    let home = UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
    home.join(CONFIG_DIR_NAME)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: default_config_dir().join(CONFIG_FILE_NAME),
            pipeline: PipelineConfig::default(),
            observability: ObservabilityConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}
