//! daogen core library.
//!
//! Generates a data-access module for one entity struct from the `#[dao]`
//! annotations on its fields:
//!
//! ```ignore
//! #[derive(daogen_macros::DaoEntity)]
//! pub struct Person {
//!     #[dao(r#"column:"id" identity:"true""#)]
//!     pub id: i64,
//!     #[dao(r#"column:"first_name""#)]
//!     pub first_name: String,
//!     #[dao(r#"column:"email" updatable:"false""#)]
//!     pub email: String,
//! }
//! ```
//!
//! The pipeline is locate ([`locator`]) -> synthesize ([`statement`]) ->
//! resolve imports ([`imports`]) -> render ([`render`]); [`generate`] runs all
//! of it for a [`DaoRequest`].

pub mod config;
pub mod errors;
pub mod generate;
pub mod imports;
pub mod locator;
pub mod model;
pub mod module;
pub mod render;
pub mod statement;
pub mod tag;

pub use config::DaogenConfig;
pub use errors::{Error, Result};
pub use generate::{DaoRequest, GeneratedDao, generate};
pub use imports::{ImportGroups, ImportSet, KnownStdModules, ResolvedImports, StdLibrary, resolve_imports};
pub use locator::{SourceTree, field_mapping, find_entity, find_home_module, locate_entity};
pub use model::{EntityMapping, FieldMapping};
pub use module::{ModuleInfo, Package};
pub use statement::{InsertStatement, Statements};
pub use tag::{FieldTag, TagError};
