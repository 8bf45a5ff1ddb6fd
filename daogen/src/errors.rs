use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type returned by the daogen pipeline.
///
/// Every variant is terminal for the current generation run; nothing is
/// retried because all inputs are local and deterministic.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested entity matches no type declaration in the search tree.
    #[error("entity `{entity}` not found")]
    NotFound { entity: String },

    /// A `#[dao(...)]` annotation could not be understood. Extraction of the
    /// whole entity is abandoned, no partial field list is returned.
    #[error("malformed annotation on `{entity}.{field}`: {reason}")]
    MalformedAnnotation {
        entity: String,
        field: String,
        key: Option<String>,
        value: Option<String>,
        reason: String,
    },

    /// A source file in the search tree is not valid Rust.
    #[error("failed to parse {}: {source}", path.display())]
    UnparseableSource {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    /// Filesystem access failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Module metadata for a directory or file could not be derived.
    #[error("cannot resolve module for {}: {reason}", target.display())]
    ModuleResolution { target: PathBuf, reason: String },

    /// A mapped field has no column name, so no statement can reference it.
    #[error("field `{entity}.{field}` has no column name")]
    UnmappedColumn { entity: String, field: String },

    /// The generated tokens could not be turned into a source file.
    #[error("failed to render generated code: {reason}")]
    Render { reason: String },

    /// `daogen.toml` exists but is not valid.
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn module_resolution(target: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ModuleResolution {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// True when the error only reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
