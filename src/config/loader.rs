//! Configuration Loader
//!
//! Environment-aware configuration loading: a base file, an environment
//! overlay, then `QUERY__` prefixed environment variables.

use super::QueryConfig;
use crate::error::Result;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const CONFIG_FILE_STEM: &str = "query";
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "toml", "json"];

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: QueryConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> Result<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> Result<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::build(&config_directory, environment)?;
        config.validate()?;

        debug!(
            batch_size = config.batch_size,
            dialect = %config.database.dialect,
            max_connections = config.database.max_connections,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// First existing `<stem>.<ext>` in `directory`
    fn find_file(directory: &Path, stem: &str) -> Option<PathBuf> {
        CONFIG_EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{stem}.{extension}")))
            .find(|path| path.is_file())
    }

    fn build(directory: &Path, environment: &str) -> Result<QueryConfig> {
        let overlay_stem = format!("{CONFIG_FILE_STEM}.{environment}");
        let mut builder = Config::builder();

        for stem in [CONFIG_FILE_STEM, overlay_stem.as_str()] {
            if let Some(path) = Self::find_file(directory, stem) {
                debug!("Reading configuration file: {}", path.display());
                builder = builder.add_source(File::from(path));
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix("QUERY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect the environment from `QUERY_ENV`, then `APP_ENV`
    pub fn detect_environment() -> String {
        env::var("QUERY_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var("QUERY_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
