use super::Config;
use super::types::{CONFIG_FILE_NAME, default_config_dir};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.nutrilens/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        Self::load_from(&default_config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the config at `path`, creating it with defaults when missing.
    /// Environment overrides are applied on top of whatever was read.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(ConfigError::Io)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(e.to_string()))
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config.config_path = path.to_path_buf();
            config
        } else {
            if let Some(dir) = path.parent()
                && !dir.as_os_str().is_empty()
            {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %path.display(), "wrote default config");
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.host.trim().is_empty() {
            return Err(ConfigError::Validation("gateway.host must not be empty".into()));
        }
        if self.gateway.port == 0 {
            return Err(ConfigError::Validation("gateway.port must not be 0".into()));
        }
        Ok(())
    }
}
