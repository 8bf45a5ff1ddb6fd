//! Cargo package metadata and Rust module paths.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A module inside a crate, e.g. `shop::dto::person`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleInfo {
    /// Crate name as used in paths (`-` already replaced by `_`)
    pub crate_name: String,
    /// Module segments below the crate root
    pub segments: Vec<String>,
}

impl ModuleInfo {
    pub fn new(crate_name: impl Into<String>, segments: Vec<String>) -> Self {
        Self {
            crate_name: crate_name.into(),
            segments,
        }
    }

    /// Absolute path, e.g. `shop::dto::person`.
    pub fn path(&self) -> String {
        self.path_with_root(&self.crate_name)
    }

    /// Path as written from inside `from_crate`: `crate::...` for the same
    /// crate, the absolute path otherwise.
    pub fn path_from(&self, from_crate: &str) -> String {
        if self.crate_name == from_crate {
            self.path_with_root("crate")
        } else {
            self.path()
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(self.crate_name.clone(), segments)
    }

    fn path_with_root(&self, root: &str) -> String {
        std::iter::once(root)
            .chain(self.segments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("::")
    }
}

impl fmt::Display for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Option<PackageSection>,
    lib: Option<LibSection>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LibSection {
    name: Option<String>,
    path: Option<String>,
}

/// The Cargo package owning a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Directory holding `Cargo.toml`
    pub manifest_dir: PathBuf,
    pub crate_name: String,
    /// Directory holding the crate root file (`src/` unless `[lib] path` says otherwise)
    pub source_dir: PathBuf,
    /// Files that are crate roots: the library root and `src/main.rs`
    pub root_files: Vec<PathBuf>,
}

impl Package {
    /// Find the nearest package at or above `start`.
    ///
    /// `start` does not need to exist; manifests without a `[package]` table
    /// (virtual workspace roots) are skipped.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = normalize(start)?;
        for dir in start.ancestors() {
            let manifest_path = dir.join("Cargo.toml");
            if !manifest_path.is_file() {
                continue;
            }
            if let Some(package) = Self::load(dir, &manifest_path)? {
                return Ok(package);
            }
        }
        Err(Error::module_resolution(start, "no Cargo package found in any parent directory"))
    }

    fn load(dir: &Path, manifest_path: &Path) -> Result<Option<Self>> {
        let content = std::fs::read_to_string(manifest_path).map_err(|e| Error::io(manifest_path, e))?;
        let manifest: Manifest = toml::from_str(&content)
            .map_err(|e| Error::module_resolution(manifest_path, format!("invalid Cargo.toml: {e}")))?;

        let Some(package) = manifest.package else {
            return Ok(None);
        };

        let lib = manifest.lib.as_ref();
        let crate_name = lib
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| package.name.replace('-', "_"));
        let lib_root = match lib.and_then(|l| l.path.as_deref()) {
            Some(path) => normalize(&dir.join(path))?,
            None => normalize(&dir.join("src").join("lib.rs"))?,
        };
        let source_dir = lib_root.parent().map_or_else(|| dir.join("src"), Path::to_path_buf);
        let root_files = vec![lib_root, normalize(&dir.join("src").join("main.rs"))?];

        Ok(Some(Self {
            manifest_dir: dir.to_path_buf(),
            crate_name,
            source_dir,
            root_files,
        }))
    }

    fn root_module(&self) -> ModuleInfo {
        ModuleInfo::new(self.crate_name.clone(), Vec::new())
    }

    /// Module a directory corresponds to: `src/storage` -> `crate::storage`.
    pub fn module_for_dir(&self, dir: &Path) -> Result<ModuleInfo> {
        let dir = normalize(dir)?;
        let relative = dir.strip_prefix(&self.source_dir).map_err(|_| {
            Error::module_resolution(
                &dir,
                format!("outside the package source directory {}", self.source_dir.display()),
            )
        })?;
        let segments = module_segments(&dir, relative)?;
        Ok(ModuleInfo::new(self.crate_name.clone(), segments))
    }

    /// Module a source file defines: `src/dto/person.rs` -> `crate::dto::person`,
    /// `src/dto/mod.rs` -> `crate::dto`. Only the crate root files map to the
    /// crate root; `src/app/main.rs` is the module `app::main`.
    pub fn module_for_file(&self, file: &Path) -> Result<ModuleInfo> {
        let file = normalize(file)?;
        if self.root_files.contains(&file) {
            return Ok(self.root_module());
        }
        let relative = file.strip_prefix(&self.source_dir).map_err(|_| {
            Error::module_resolution(
                &file,
                format!("outside the package source directory {}", self.source_dir.display()),
            )
        })?;
        let without_extension = relative.with_extension("");
        let mut segments = module_segments(&file, &without_extension)?;

        if segments.last().is_some_and(|last| last == "mod") {
            segments.pop();
        }

        if segments.is_empty() {
            return Ok(self.root_module());
        }
        Ok(ModuleInfo::new(self.crate_name.clone(), segments))
    }
}

fn module_segments(target: &Path, relative: &Path) -> Result<Vec<String>> {
    relative
        .components()
        .map(|c| {
            let segment = c.as_os_str().to_string_lossy().to_string();
            if is_identifier(&segment) {
                Ok(segment)
            } else {
                Err(Error::module_resolution(
                    target,
                    format!("`{segment}` is not a valid module name"),
                ))
            }
        })
        .collect()
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    segment != "_" && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Absolute, lexically cleaned path. Symlinks are not resolved so that paths
/// which do not exist yet can be handled.
pub(crate) fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}
