use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

pub use crate::domain::errors::ConfigError;
use crate::domain::models::config::NavigatorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .navigator/config.yaml (project config)
    /// 3. .navigator/local.yaml (local overrides, optional)
    /// 4. Environment variables (NAVIGATOR_* prefix, `__` separates sections)
    pub fn load() -> Result<NavigatorConfig> {
        Self::load_from(Self::figment())
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<NavigatorConfig> {
        let figment = Figment::new()
            .merge(Serialized::defaults(NavigatorConfig::default()))
            .merge(Yaml::file(path.as_ref()));
        let config: NavigatorConfig = figment.extract().context(format!(
            "Failed to load config from {}",
            path.as_ref().display()
        ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged provider stack used by [`ConfigLoader::load`]
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(NavigatorConfig::default()))
            .merge(Yaml::file(".navigator/config.yaml"))
            .merge(Yaml::file(".navigator/local.yaml"))
            .merge(Env::prefixed("NAVIGATOR_").split("__"))
    }

    /// Render the defaults as YAML, suitable for a starter `.navigator/config.yaml`
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&NavigatorConfig::default())
            .context("Failed to serialize default configuration")
    }

    fn load_from(figment: Figment) -> Result<NavigatorConfig> {
        let config: NavigatorConfig = figment
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &NavigatorConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !ROTATIONS.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
