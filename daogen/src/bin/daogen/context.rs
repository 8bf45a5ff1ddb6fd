use anyhow::{Context, Result};
use daogen::DaogenConfig;
use daogen::config::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Project context for daogen operations
pub struct ProjectContext {
    /// Root directory of the project (where Cargo.toml is)
    pub project_root: PathBuf,
    /// Path to daogen.toml, which may not exist
    pub config_path: PathBuf,
    /// Loaded configuration, defaults when no file is present
    pub config: DaogenConfig,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start)?;
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        let config = DaogenConfig::load(&project_root).with_context(|| format!("Failed to load {CONFIG_FILE}"))?;

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    /// Find project root by looking for Cargo.toml
    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let cargo_toml = current.join("Cargo.toml");
            if cargo_toml.exists() {
                return Ok(current);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find Cargo.toml in {start:?} or any parent directory. \
                     Are you in a Rust project?"
                );
            }
        }
    }

    pub fn has_config_file(&self) -> bool {
        self.config_path.is_file()
    }

    /// Tree searched for entities
    pub fn search_root(&self) -> PathBuf {
        self.config.search_root(&self.project_root)
    }
}
