//! Unified path management for fieldtrack configuration files.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for fieldtrack.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/fieldtrack/        # Config directory
/// └── config.toml              # Tracker configuration
/// ```
pub struct FieldtrackPaths;

impl FieldtrackPaths {
    /// Returns the fieldtrack configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/fieldtrack/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("fieldtrack"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = FieldtrackPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("fieldtrack"));
    }

    #[test]
    fn test_config_file() {
        let config_file = FieldtrackPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        // Verify it's under config_dir
        let config_dir = FieldtrackPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }
}
