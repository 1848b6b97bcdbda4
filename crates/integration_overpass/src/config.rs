//! Overpass service configuration

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the Overpass API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Base URL of the Overpass API (the interpreter lives at `{base_url}/interpreter`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request (Overpass operators ask for one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://overpass-api.de/api".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("RouteNavigator/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Full URL of the query interpreter endpoint
    #[must_use]
    pub fn interpreter_url(&self) -> String {
        format!("{}/interpreter", self.base_url.trim_end_matches('/'))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if let Err(e) = Url::parse(&self.base_url) {
            return Err(format!("base_url is not a valid URL: {e}"));
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        Ok(())
    }
}
