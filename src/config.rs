use std::path::Path;

use tracing::warn;

use crate::data::SamplerConfig;
use crate::error::ConfigError;
use crate::network::DualHeadResNetConfig;

/// Network shape, loadable from the `[network]` table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub num_blocks: usize,
    pub num_features: usize,
    /// Number of actions; must equal the board area.
    pub policy_size: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        NetworkSettings {
            num_blocks: 4,
            num_features: 64,
            policy_size: 42,
        }
    }
}

impl NetworkSettings {
    pub fn model_config(&self) -> DualHeadResNetConfig {
        DualHeadResNetConfig::new(self.num_blocks, self.num_features, self.policy_size)
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkSettings,
    pub sampler: SamplerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.num_features == 0 {
            return Err(ConfigError::Validation(
                "network.num_features must be > 0".into(),
            ));
        }
        if self.network.policy_size == 0 {
            return Err(ConfigError::Validation(
                "network.policy_size must be > 0".into(),
            ));
        }

        if self.sampler.slice_size == 0 {
            return Err(ConfigError::Validation(
                "sampler.slice_size must be > 0".into(),
            ));
        }
        if self.sampler.batch_size == 0 {
            return Err(ConfigError::Validation(
                "sampler.batch_size must be > 0".into(),
            ));
        }
        if self.sampler.batch_size % self.sampler.slice_size != 0 {
            return Err(ConfigError::Validation(
                "sampler.batch_size must be a multiple of sampler.slice_size".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
