//! Configuration loader
//! Layers an optional TOML file with `FLIGHT_SURETY__*` environment variables

use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::info;

use super::{AppConfig, ProtocolConfig};
use crate::error::{FlightSuretyError, Result};

/// Load the application configuration.
///
/// Missing keys fall back to defaults. Environment variables use a double
/// underscore as the nesting separator, e.g. `FLIGHT_SURETY__PROTOCOL__RESPONSE_QUORUM=5`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        info!("Loading configuration from: {:?}", path);
        if !path.exists() {
            return Err(FlightSuretyError::ConfigError(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("FLIGHT_SURETY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.protocol.validate()?;

    info!("Configuration loaded");
    Ok(app_config)
}

impl ProtocolConfig {
    /// Validate the protocol constants
    pub fn validate(&self) -> Result<()> {
        if self.admission_threshold == 0 {
            return Err(FlightSuretyError::ConfigError(
                "admission_threshold must be at least 1".to_string(),
            ));
        }

        if self.response_quorum == 0 {
            return Err(FlightSuretyError::ConfigError(
                "response_quorum must be at least 1".to_string(),
            ));
        }

        if self.index_range == 0 || self.index_range > 256 {
            return Err(FlightSuretyError::ConfigError(format!(
                "index_range ({}) must be between 1 and 256",
                self.index_range
            )));
        }

        if self.index_set_size == 0 || self.index_set_size > self.index_range as usize {
            return Err(FlightSuretyError::ConfigError(format!(
                "index_set_size ({}) must be between 1 and index_range ({})",
                self.index_set_size, self.index_range
            )));
        }

        Ok(())
    }

    /// Render the constants as TOML for operators
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
