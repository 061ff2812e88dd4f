//! Configuration loader for the observer manager
//!
//! Reads YAML from a string or a file. A missing file is not an error; the
//! defaults apply, just like an empty document.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::ManagerConfig;
use crate::error::Result;

/// Loads [`ManagerConfig`] from YAML sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a specific file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or contains
    /// invalid YAML or invalid settings.
    pub fn load_from_path(path: &Path) -> Result<ManagerConfig> {
        // If file doesn't exist, use defaults (not an error)
        if !path.exists() {
            debug!(path = %path.display(), "No observer configuration file, using defaults");
            return Ok(ManagerConfig::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse_yaml(&content)?;
        debug!(path = %path.display(), ?config, "Loaded observer configuration");
        Ok(config)
    }

    /// Parse YAML configuration content
    pub fn parse_yaml(content: &str) -> Result<ManagerConfig> {
        if content.trim().is_empty() {
            return Ok(ManagerConfig::default());
        }

        let config: ManagerConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
