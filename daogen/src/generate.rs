//! End-to-end generation: locate, synthesize, resolve imports, render.

use std::path::PathBuf;

use log::{info, warn};

use crate::errors::{Error, Result};
use crate::imports::{DEFAULT_ALIAS, ResolvedImports, resolve_imports};
use crate::locator::{SourceTree, find_entity};
use crate::model::EntityMapping;
use crate::render::{RenderInput, dao_file_name, render_dao};
use crate::statement::Statements;

/// One generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoRequest {
    /// Root of the tree searched for the entity
    pub root: PathBuf,
    pub entity: String,
    pub table: String,
    /// Directory the DAO is written to; relative paths start at `root`
    pub output_dir: PathBuf,
    pub alias: String,
    pub file_suffix: String,
    pub exclude: Vec<String>,
}

impl DaoRequest {
    pub fn new(
        root: impl Into<PathBuf>,
        entity: impl Into<String>,
        table: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            entity: entity.into(),
            table: table.into(),
            output_dir: output_dir.into(),
            alias: DEFAULT_ALIAS.to_string(),
            file_suffix: "_dao".to_string(),
            exclude: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    pub fn tree(&self) -> SourceTree {
        self.exclude
            .iter()
            .fold(SourceTree::new(&self.root), |tree, name| tree.exclude(name.clone()))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(dao_file_name(&self.entity, &self.file_suffix))
    }
}

/// Mapping and statements of the requested entity. A missing entity is an error.
pub fn extract(request: &DaoRequest) -> Result<(EntityMapping, Statements)> {
    let mapping = find_entity(&request.tree(), &request.entity, &request.table)?.ok_or_else(|| Error::NotFound {
        entity: request.entity.clone(),
    })?;
    if mapping.is_empty() {
        warn!("entity `{}` has no #[dao] annotated fields", request.entity);
    }
    let statements = Statements::from_mapping(&mapping);
    Ok((mapping, statements))
}

/// Import resolution for the requested entity and output directory.
pub fn resolve(request: &DaoRequest) -> Result<ResolvedImports> {
    resolve_imports(&request.tree(), &request.entity, &request.output_dir, &request.alias)
}

/// Result of a generation run, not yet written.
#[derive(Debug, Clone)]
pub struct GeneratedDao {
    pub path: PathBuf,
    pub content: String,
    pub mapping: EntityMapping,
    pub statements: Statements,
    pub imports: ResolvedImports,
}

/// Run the whole pipeline for one entity.
pub fn generate(request: &DaoRequest) -> Result<GeneratedDao> {
    let (mapping, statements) = extract(request)?;
    if !statements.is_keyed() {
        warn!(
            "entity `{}` has no identity field, only `create` will be generated",
            request.entity
        );
    }

    let imports = resolve(request)?;
    let content = render_dao(&RenderInput {
        entity: &request.entity,
        mapping: &mapping,
        statements: &statements,
        imports: &imports,
    })?;

    let path = request.output_path();
    info!(
        "generated {} for `{}` ({} fields)",
        path.display(),
        request.entity,
        mapping.fields.len()
    );

    Ok(GeneratedDao {
        path,
        content,
        mapping,
        statements,
        imports,
    })
}

impl GeneratedDao {
    /// Create the output directory and write the file.
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&self.path, &self.content).map_err(|e| Error::io(&self.path, e))
    }

    /// Write only when the file content differs. Returns whether it wrote.
    pub fn write_if_changed(&self) -> Result<bool> {
        match std::fs::read_to_string(&self.path) {
            Ok(existing) if existing == self.content => Ok(false),
            _ => self.write().map(|()| true),
        }
    }
}
