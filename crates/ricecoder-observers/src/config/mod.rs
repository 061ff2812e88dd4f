//! Observer manager configuration
//!
//! Configuration is plain YAML; every field is optional:
//!
//! ```yaml
//! max_hierarchy_depth: 32
//! catch_panics: true
//! ```

pub mod loader;

pub use loader::ConfigLoader;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ObserverError, Result};

/// Default bound on event type ancestor walks
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 32;

/// Tunables of an [`ObserverManager`](crate::ObserverManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Longest ancestor chain an event type may have, the type itself included
    ///
    /// Handlers bound to a type whose chain is longer are rejected at
    /// registration; dispatch never looks further up.
    pub max_hierarchy_depth: usize,

    /// Contain handler panics and report them like returned errors
    ///
    /// When off, a panicking handler unwinds out of `fire` and the handlers
    /// after it do not run. Failures then no longer stay inside dispatch.
    pub catch_panics: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
            catch_panics: true,
        }
    }
}

impl ManagerConfig {
    /// Parse and validate a YAML document; an empty document yields the defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        ConfigLoader::parse_yaml(content)
    }

    /// Load and validate a YAML file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::load_from_path(path.as_ref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_hierarchy_depth == 0 {
            return Err(ObserverError::Config(
                "max_hierarchy_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
