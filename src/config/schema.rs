/// Configuration schema and defaults for carbonwise.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[api]`, `[defaults]`, `[web]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level carbonwise configuration.
///
/// Maps directly to `~/.carbonwise/config.toml` and `.carbonwise.toml`.
/// All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonConfig {
    pub api: ApiConfig,
    pub defaults: DefaultsConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the emissions backend.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [defaults]
// ---------------------------------------------------------------------------

/// Values pre-filled into forms when the user leaves them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Grid country code used for lifecycle calculations.
    pub country: String,
    /// Grid data year.
    pub grid_year: i32,
    /// Annual distance for impact projections (km).
    pub annual_km: f64,
    /// Countries compared on the vehicle detail sensitivity chart.
    pub sensitivity_countries: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            grid_year: 2024,
            annual_km: 15_000.0,
            sensitivity_countries: ["US", "DE", "FR", "UK", "CN", "JP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Local dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `carbonwise web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9750".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Request log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every backend call to `~/.carbonwise/request-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl CarbonConfig {
    /// The annotated default config written by `carbonwise config init`.
    pub fn default_toml() -> String {
        r#"# carbonwise configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CARBONWISE_*)
#   2. Project config (.carbonwise.toml in current directory)
#   3. User global config (~/.carbonwise/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://localhost:5000"

[defaults]
country = "US"
grid_year = 2024
annual_km = 15000.0
sensitivity_countries = ["US", "DE", "FR", "UK", "CN", "JP"]

[web]
addr = "127.0.0.1:9750"
open_browser = true

[logging]
enabled = true   # ~/.carbonwise/request-log.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CarbonConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.defaults.country, "US");
        assert_eq!(config.defaults.grid_year, 2024);
        assert_eq!(config.defaults.sensitivity_countries.len(), 6);
        assert_eq!(config.web.addr, "127.0.0.1:9750");
        assert!(config.logging.enabled);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[api]
base_url = "http://emissions.internal:8000"
"#;
        let config: CarbonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://emissions.internal:8000");
        assert_eq!(config.defaults.country, "US");
        assert!(config.web.open_browser);
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: CarbonConfig = toml::from_str("").unwrap();
        assert_eq!(config, CarbonConfig::default());
    }

    #[test]
    fn default_toml_parses_back() {
        let config: CarbonConfig = toml::from_str(&CarbonConfig::default_toml()).unwrap();
        assert_eq!(config, CarbonConfig::default());
    }
}
