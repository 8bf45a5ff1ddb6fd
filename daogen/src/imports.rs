//! Import resolution for generated DAO modules.
//!
//! The resolver seeds the import set with the paths every generated module
//! needs, finds the module the entity is declared in, compares it with the
//! module the file will be written to and, when they differ, imports the
//! entity's module under an alias.

use std::collections::BTreeSet;
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::errors::Result;
use crate::locator::{SourceTree, find_home_module};
use crate::module::{ModuleInfo, Package};

/// Formatting support for the generated error type.
pub const FORMAT_IMPORT: &str = "std::fmt";
/// Trait running statements against a pool.
pub const EXECUTOR_IMPORT: &str = "sqlx::Executor";
/// Database-agnostic driver layer.
pub const DRIVER_IMPORT: &str = "sqlx::any";

/// Default alias for the entity's home module.
pub const DEFAULT_ALIAS: &str = "model";

/// Unique import paths, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSet(BTreeSet<String>);

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seeded with the imports every generated module uses.
    pub fn base() -> Self {
        let mut set = Self::new();
        set.add(FORMAT_IMPORT);
        set.add(EXECUTOR_IMPORT);
        set.add(DRIVER_IMPORT);
        set
    }

    /// Insert a path. Blank paths are ignored.
    pub fn add(&mut self, path: impl AsRef<str>) {
        let path = path.as_ref().trim();
        if !path.is_empty() {
            self.0.insert(path.to_string());
        }
    }

    /// Split into standard-library and external paths, each sorted.
    pub fn group(&self, std_library: &dyn StdLibrary) -> ImportGroups {
        let (standard, external) = self.0.iter().cloned().partition(|path| is_standard(path, std_library));
        ImportGroups { standard, external }
    }
}

/// Imports partitioned for emission, standard group first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportGroups {
    pub standard: Vec<String>,
    pub external: Vec<String>,
}

impl ImportGroups {
    /// All paths, standard group first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.standard.iter().chain(&self.external).map(String::as_str)
    }
}

/// Standard-library path lookup.
pub trait StdLibrary {
    /// Whether `path` names something the toolchain's standard library provides.
    fn resolves(&self, path: &str) -> bool;
}

/// Lookup against the stable top-level modules of `std`, `core` and `alloc`.
///
/// Only the first module below the crate is checked; anything deeper is
/// accepted once that module exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownStdModules;

const STD_MODULES: &[&str] = &[
    "alloc", "any", "arch", "array", "ascii", "backtrace", "borrow", "boxed", "cell", "char", "clone", "cmp",
    "collections", "convert", "default", "env", "error", "f32", "f64", "ffi", "fmt", "fs", "future", "hash",
    "hint", "i8", "i16", "i32", "i64", "i128", "io", "isize", "iter", "marker", "mem", "net", "num", "ops",
    "option", "os", "panic", "path", "pin", "prelude", "primitive", "process", "ptr", "rc", "result", "slice",
    "str", "string", "sync", "task", "thread", "time", "u8", "u16", "u32", "u64", "u128", "usize", "vec",
];

const CORE_MODULES: &[&str] = &[
    "alloc", "any", "arch", "array", "ascii", "borrow", "cell", "char", "clone", "cmp", "convert", "default",
    "error", "f32", "f64", "ffi", "fmt", "future", "hash", "hint", "i8", "i16", "i32", "i64", "i128", "iter",
    "isize", "marker", "mem", "net", "num", "ops", "option", "panic", "pin", "prelude", "primitive", "ptr",
    "result", "slice", "str", "sync", "task", "time", "u8", "u16", "u32", "u64", "u128", "usize",
];

const ALLOC_MODULES: &[&str] = &[
    "alloc", "borrow", "boxed", "collections", "ffi", "fmt", "rc", "slice", "str", "string", "sync", "task", "vec",
];

impl StdLibrary for KnownStdModules {
    fn resolves(&self, path: &str) -> bool {
        let mut segments = path.split("::").map(str::trim);
        let modules = match segments.next() {
            Some("std") => STD_MODULES,
            Some("core") => CORE_MODULES,
            Some("alloc") => ALLOC_MODULES,
            _ => return false,
        };
        match segments.next() {
            None => true,
            Some(module) => modules.contains(&module),
        }
    }
}

/// Classify one import path. An alias suffix (` as name`) is ignored.
pub fn is_standard(path: &str, std_library: &dyn StdLibrary) -> bool {
    let path = strip_alias(path).trim_start_matches("::");
    let root = path.split("::").next().unwrap_or_default();
    matches!(root, "std" | "core" | "alloc") && std_library.resolves(path)
}

fn strip_alias(path: &str) -> &str {
    path.split_once(" as ").map_or(path, |(path, _)| path).trim()
}

/// Everything the renderer needs to emit the `use` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImports {
    /// Module the generated file is placed under
    pub output_module: ModuleInfo,
    /// Module declaring the entity
    pub home_module: ModuleInfo,
    pub imports: ImportSet,
    /// True when entity references must go through `alias`
    pub alias_needed: bool,
    pub alias: String,
}

impl ResolvedImports {
    pub fn groups(&self) -> ImportGroups {
        self.imports.group(&KnownStdModules)
    }
}

/// Resolve the imports of a DAO for `entity` written to `output_dir`.
///
/// A relative `output_dir` is taken relative to the tree root. Both the
/// entity's home module and the output module must resolve.
pub fn resolve_imports(tree: &SourceTree, entity: &str, output_dir: &Path, alias: &str) -> Result<ResolvedImports> {
    let mut imports = ImportSet::base();
    let home_module = find_home_module(tree, entity)?;

    let output_dir = tree.root().join(output_dir);
    let output_module = Package::discover(&output_dir)?.module_for_dir(&output_dir)?;
    debug!("output module for {} is {output_module}", output_dir.display());

    let alias_needed = home_module != output_module;
    if alias_needed {
        imports.add(format!("{} as {alias}", home_module.path_from(&output_module.crate_name)));
    }

    Ok(ResolvedImports {
        output_module,
        home_module,
        imports,
        alias_needed,
        alias: alias.to_string(),
    })
}
