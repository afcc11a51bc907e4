//! Configuration service implementation.
//!
//! Loads the tracker configuration from the configuration file
//! (~/.config/fieldtrack/config.toml), creating it with defaults when
//! missing.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use fieldtrack_core::config::TrackerConfig;
use fieldtrack_core::error::Result;

use crate::config_storage::ConfigStorage;
use crate::paths::FieldtrackPaths;

/// Configuration service that loads and caches the tracker configuration.
///
/// The configuration is read once and cached to avoid repeated file I/O.
#[derive(Clone)]
pub struct ConfigService {
    storage: Arc<ConfigStorage>,
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<TrackerConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService over an explicit config file path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            storage: Arc::new(ConfigStorage::new(path)),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService over the platform default config file.
    ///
    /// # Errors
    ///
    /// Returns a Config error if the platform config directory cannot
    /// be determined.
    pub fn default_location() -> Result<Self> {
        let path = FieldtrackPaths::config_file()
            .map_err(|e| fieldtrack_core::FieldtrackError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &PathBuf {
        self.storage.path()
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// Falls back to defaults (and logs a warning) if the file cannot
    /// be read.
    pub fn get_config(&self) -> TrackerConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_or_seed() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                TrackerConfig::default()
            }
        };

        {
            let mut write_lock = self.config.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    /// Saves a configuration and refreshes the cache.
    pub fn save(&self, config: &TrackerConfig) -> Result<()> {
        self.storage.save(config)?;
        let mut write_lock = self.config.write().unwrap();
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Loads the config, writing a default file when none exists yet.
    fn load_or_seed(&self) -> Result<TrackerConfig> {
        match self.storage.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = TrackerConfig::default();
                self.storage.save(&default_config)?;
                Ok(default_config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtrack_core::config::BrandingConfig;
    use tempfile::TempDir;

    #[test]
    fn test_get_config_seeds_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());

        let config = service.get_config();
        assert_eq!(config, TrackerConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_get_config_is_cached_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());

        let _ = service.get_config();

        // Mutate the file behind the cache
        let updated = TrackerConfig {
            branding: BrandingConfig {
                app_name: "Renamed".to_string(),
                ..BrandingConfig::default()
            },
            ..TrackerConfig::default()
        };
        ConfigStorage::new(path).save(&updated).unwrap();

        assert_eq!(service.get_config().branding.app_name, "Fieldtrack");

        service.invalidate_cache();
        assert_eq!(service.get_config().branding.app_name, "Renamed");
    }

    #[test]
    fn test_save_refreshes_cache() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let mut config = service.get_config();
        config.update.interval_ms = 5_000;
        service.save(&config).unwrap();

        assert_eq!(service.get_config().update.interval_ms, 5_000);
    }
}
