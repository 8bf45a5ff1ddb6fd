//! Optional `daogen.toml` project configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::imports::DEFAULT_ALIAS;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = "daogen.toml";

/// Configuration stored in `daogen.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaogenConfig {
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub locator: LocatorSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Tree walked for entities, relative to the project root
    #[serde(default = "default_search_root")]
    pub search_root: String,
    #[serde(default = "default_alias")]
    pub alias: String,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            search_root: default_search_root(),
            alias: default_alias(),
            file_suffix: default_file_suffix(),
        }
    }
}

fn default_search_root() -> String {
    ".".to_string()
}

fn default_alias() -> String {
    DEFAULT_ALIAS.to_string()
}

fn default_file_suffix() -> String {
    "_dao".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorSettings {
    /// Extra directory names skipped while walking
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl DaogenConfig {
    /// Load `daogen.toml` from `project_root`, falling back to defaults when
    /// the file does not exist.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        toml::from_str(&content).map_err(|source| Error::Config { path, source })
    }

    pub fn search_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.generator.search_root)
    }
}
