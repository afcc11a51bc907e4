//! Configuration model.
//!
//! Branding is data, not a forked class tree: app identity, the
//! broadcast-topic prefix and channel identifiers are all parameters of
//! one configuration.

use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::provider::{ProviderKind, UpdateRequest};

/// App identity and naming parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BrandingConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Prefix for app-internal broadcast topics.
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
}

fn default_app_name() -> String {
    "Fieldtrack".to_string()
}

fn default_topic_prefix() -> String {
    "fieldtrack".to_string()
}

fn default_channel_id() -> String {
    "fieldtrack_location_service".to_string()
}

fn default_channel_name() -> String {
    "Location Tracking".to_string()
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            topic_prefix: default_topic_prefix(),
            channel_id: default_channel_id(),
            channel_name: default_channel_name(),
        }
    }
}

impl BrandingConfig {
    /// The topic position updates are broadcast on.
    pub fn update_topic(&self) -> String {
        format!("{}.LOCATION_UPDATE", self.topic_prefix)
    }
}

/// The simulated platform the CLI host runs the tracker against:
/// which grants are held and which providers are enabled.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SimulatedEnvironment {
    #[serde(default = "default_api_level")]
    pub api_level: u32,
    #[serde(default = "default_granted")]
    pub granted: Vec<Permission>,
    #[serde(default = "default_enabled_providers")]
    pub enabled_providers: Vec<ProviderKind>,
}

fn default_api_level() -> u32 {
    34
}

fn default_granted() -> Vec<Permission> {
    vec![Permission::FineLocation, Permission::ForegroundService]
}

fn default_enabled_providers() -> Vec<ProviderKind> {
    vec![ProviderKind::Satellite, ProviderKind::Network]
}

impl Default for SimulatedEnvironment {
    fn default() -> Self {
        Self {
            api_level: default_api_level(),
            granted: default_granted(),
            enabled_providers: default_enabled_providers(),
        }
    }
}

/// Root configuration for the tracker host.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct TrackerConfig {
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    pub update: UpdateRequest,
    #[serde(default)]
    pub environment: SimulatedEnvironment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: TrackerConfig = toml::from_str("").unwrap();
        assert_eq!(config.branding.app_name, "Fieldtrack");
        assert_eq!(config.update.interval_ms, 30_000);
        assert_eq!(config.environment.api_level, 34);
    }

    #[test]
    fn test_update_topic_uses_prefix() {
        let branding = BrandingConfig {
            topic_prefix: "com.example.fieldops".to_string(),
            ..BrandingConfig::default()
        };
        assert_eq!(
            branding.update_topic(),
            "com.example.fieldops.LOCATION_UPDATE"
        );
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = TrackerConfig {
            branding: BrandingConfig {
                app_name: "PACT Command Center".to_string(),
                ..BrandingConfig::default()
            },
            ..TrackerConfig::default()
        };

        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: TrackerConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_environment_overrides() {
        let config: TrackerConfig = toml::from_str(
            r#"
            [environment]
            api_level = 28
            enabled_providers = ["network"]
            "#,
        )
        .unwrap();
        assert_eq!(config.environment.api_level, 28);
        assert_eq!(
            config.environment.enabled_providers,
            vec![ProviderKind::Network]
        );
        // Untouched sections keep defaults.
        assert_eq!(
            config.environment.granted,
            vec![Permission::FineLocation, Permission::ForegroundService]
        );
    }
}
