//! Application configuration
//!
//! Split into focused sub-modules:
//! - `geolocation`: Location source and fallback coordinate
//! - `navigator`: Directory matching and route line drawing

mod geolocation;
mod navigator;

use std::path::Path;

use application::services::MapSettings;
use integration_overpass::OverpassConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

pub use geolocation::{GeoLocationConfig, GeolocationAppConfig};
pub use navigator::{DirectoryAppConfig, RouteAppConfig};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Name of the optional configuration file, without extension
const CONFIG_FILE: &str = "route-navigator";

/// Prefix for environment overrides (e.g., `ROUTE_NAVIGATOR_OVERPASS__TIMEOUT_SECS`)
const ENV_PREFIX: &str = "ROUTE_NAVIGATOR";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Overpass API used for the nearby stop lookup
    #[serde(default)]
    pub overpass: OverpassConfig,

    /// Location source settings
    #[serde(default)]
    pub geolocation: GeolocationAppConfig,

    /// Map display settings
    #[serde(default)]
    pub map: MapSettings,

    /// Bus directory settings
    #[serde(default)]
    pub directory: DirectoryAppConfig,

    /// Route line settings
    #[serde(default)]
    pub route: RouteAppConfig,

    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// Reads `route-navigator.{toml,yaml,json}` from the working directory
    /// if present, then applies environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(config::File::with_name(CONFIG_FILE).required(false))
    }

    /// Load configuration from an explicit file plus environment overrides
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load_with(config::File::from(path).required(true))
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let config = Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        config.try_deserialize()
    }

    fn load_with(
        file: impl config::Source + Send + Sync + 'static,
    ) -> Result<Self, config::ConfigError> {
        let builder = Self::defaults()?
            // Load from file if exists
            .add_source(file)
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let app: Self = config.try_deserialize()?;
        debug!(
            overpass = %app.overpass.base_url,
            match_mode = ?app.directory.match_mode,
            "Configuration loaded"
        );
        Ok(app)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("overpass.base_url", "https://overpass-api.de/api")?
            .set_default("map.container_id", "map-container")?
            .set_default("telemetry.log_filter", "info")
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first problem found, prefixed with its section name.
    pub fn validate(&self) -> Result<(), String> {
        self.overpass
            .validate()
            .map_err(|e| format!("overpass: {e}"))?;
        self.geolocation.validate()?;
        self.map.validate().map_err(|e| format!("map: {e}"))?;
        self.route.validate()?;
        Ok(())
    }
}
