//! Entity locator: walks a source tree, finds the declaration of an entity and
//! extracts its column mapping.

use std::path::{Path, PathBuf};

use log::debug;
use syn::ext::IdentExt;
use syn::visit::{self, Visit};
use syn::{Attribute, Field, Fields, Ident, ItemStruct, LitStr};
use walkdir::WalkDir;

use crate::errors::{Error, Result};
use crate::model::{EntityMapping, FieldMapping};
use crate::module::{ModuleInfo, Package};
use crate::tag::FieldTag;

/// Name of the field attribute carrying the annotation string.
pub const ANNOTATION_ATTR: &str = "dao";

/// Directory names never descended into.
const ALWAYS_SKIPPED: &[&str] = &["target"];

/// The set of Rust files searched for entities.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    exclude: Vec<String>,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
        }
    }

    /// Skip directories with this name in addition to hidden ones and `target`.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All `.rs` files below the root, sorted by path.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        // TODO: the first match depends on this order; report an entity
        // declared in two files instead of picking the first one.
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                Error::io(path, e.into())
            })?;

            if entry.file_type().is_dir() {
                continue;
            }
            if entry.path().extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            files.push(entry.into_path());
        }

        Ok(files)
    }

    fn is_skipped(&self, entry: &walkdir::DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return true;
        }
        entry.file_type().is_dir()
            && (ALWAYS_SKIPPED.contains(&&*name) || self.exclude.iter().any(|e| *e == name))
    }
}

/// Type declaration met during the walk.
#[derive(Clone, Copy)]
enum Declaration<'ast> {
    Struct(&'ast ItemStruct),
    Enum(&'ast syn::ItemEnum),
    Union(&'ast syn::ItemUnion),
    Alias(&'ast syn::ItemType),
}

impl Declaration<'_> {
    fn ident(&self) -> &Ident {
        match self {
            Self::Struct(item) => &item.ident,
            Self::Enum(item) => &item.ident,
            Self::Union(item) => &item.ident,
            Self::Alias(item) => &item.ident,
        }
    }
}

/// What a search is looking for.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Search {
    /// Structs anywhere, including items local to function bodies.
    Fields,
    /// Any type declaration reachable through a module path.
    Module,
}

struct DeclarationFinder<'ast, 'n> {
    name: &'n str,
    search: Search,
    /// Inline `mod` blocks enclosing the current item
    modules: Vec<String>,
    /// Nesting depth inside function bodies
    local_depth: usize,
    found: Option<(Declaration<'ast>, Vec<String>)>,
}

impl<'ast, 'n> DeclarationFinder<'ast, 'n> {
    fn new(name: &'n str, search: Search) -> Self {
        Self {
            name,
            search,
            modules: Vec::new(),
            local_depth: 0,
            found: None,
        }
    }

    fn consider(&mut self, declaration: Declaration<'ast>) {
        if self.found.is_some() || declaration.ident() != self.name {
            return;
        }
        let accepted = match self.search {
            Search::Fields => matches!(declaration, Declaration::Struct(_)),
            Search::Module => self.local_depth == 0,
        };
        if accepted {
            self.found = Some((declaration, self.modules.clone()));
        }
    }
}

impl<'ast> Visit<'ast> for DeclarationFinder<'ast, '_> {
    fn visit_item(&mut self, node: &'ast syn::Item) {
        if self.found.is_none() {
            visit::visit_item(self, node);
        }
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.modules.push(node.ident.unraw().to_string());
        visit::visit_item_mod(self, node);
        self.modules.pop();
    }

    fn visit_block(&mut self, node: &'ast syn::Block) {
        self.local_depth += 1;
        visit::visit_block(self, node);
        self.local_depth -= 1;
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        self.consider(Declaration::Struct(node));
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.consider(Declaration::Enum(node));
    }

    fn visit_item_union(&mut self, node: &'ast syn::ItemUnion) {
        self.consider(Declaration::Union(node));
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.consider(Declaration::Alias(node));
    }
}

fn find_declaration<'ast>(
    file: &'ast syn::File,
    name: &str,
    search: Search,
) -> Option<(Declaration<'ast>, Vec<String>)> {
    let mut finder = DeclarationFinder::new(name, search);
    finder.visit_file(file);
    finder.found
}

fn parse_source(path: &Path) -> Result<syn::File> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    syn::parse_file(&content).map_err(|source| Error::UnparseableSource {
        path: path.to_path_buf(),
        source,
    })
}

/// Find the first struct named `entity` and extract its mapping.
///
/// Files are visited in sorted order and every one of them must parse, even
/// those visited before the match. `Ok(None)` means no struct has that name.
pub fn find_entity(tree: &SourceTree, entity: &str, table: &str) -> Result<Option<EntityMapping>> {
    for path in tree.files()? {
        debug!("scanning {}", path.display());
        let file = parse_source(&path)?;

        if let Some((Declaration::Struct(item), _)) = find_declaration(&file, entity, Search::Fields) {
            debug!("found struct `{entity}` in {}", path.display());
            return extract_mapping(entity, table, item).map(Some);
        }
    }
    Ok(None)
}

/// Like [`find_entity`] but reports a missing entity as an empty mapping that
/// still carries the table name. Callers must check [`EntityMapping::is_empty`].
pub fn locate_entity(tree: &SourceTree, entity: &str, table: &str) -> Result<EntityMapping> {
    // TODO: make a missing entity a hard `NotFound` here too, matching
    // `find_home_module`, once no caller relies on the empty mapping.
    Ok(find_entity(tree, entity, table)?.unwrap_or_else(|| EntityMapping::new(table)))
}

/// Module path of the first type declaration named `entity`.
///
/// Declarations in files outside any package source directory have no module
/// path and are passed over.
pub fn find_home_module(tree: &SourceTree, entity: &str) -> Result<ModuleInfo> {
    for path in tree.files()? {
        let file = parse_source(&path)?;
        let Some((_, inline_modules)) = find_declaration(&file, entity, Search::Module) else {
            continue;
        };

        let file_dir = path.parent().unwrap_or(tree.root());
        let module = match Package::discover(file_dir).and_then(|pkg| pkg.module_for_file(&path)) {
            Ok(module) => module,
            Err(err) => {
                debug!("skipping `{entity}` in {}: {err}", path.display());
                continue;
            }
        };

        let home = inline_modules.into_iter().fold(module, |m, segment| m.child(segment));
        debug!("home module of `{entity}` is {home}");
        return Ok(home);
    }

    Err(Error::NotFound {
        entity: entity.to_string(),
    })
}

/// Build the mapping of a struct. The first bad annotation fails the whole
/// entity and discards the fields collected so far.
fn extract_mapping(entity: &str, table: &str, item: &ItemStruct) -> Result<EntityMapping> {
    let mut mapping = EntityMapping::new(table);

    let Fields::Named(named) = &item.fields else {
        return Ok(mapping);
    };

    for field in &named.named {
        if let Some(mapped) = field_mapping(entity, field)? {
            mapping.fields.push(mapped);
        }
    }

    Ok(mapping)
}

/// Mapping of one named field, `None` for unannotated fields and annotations
/// without a recognized key.
///
/// Tag parsing is strict: a syntax error anywhere in the annotation fails the
/// field, keys before the error are not salvaged.
pub fn field_mapping(entity: &str, field: &Field) -> Result<Option<FieldMapping>> {
    let Some(ident) = &field.ident else {
        return Ok(None);
    };
    let field_name = ident.unraw().to_string();

    let Some(annotation) = read_annotation(entity, &field_name, &field.attrs)? else {
        return Ok(None);
    };
    let tag = FieldTag::parse(&annotation).map_err(|e| Error::MalformedAnnotation {
        entity: entity.to_string(),
        field: field_name.clone(),
        key: None,
        value: Some(annotation.clone()),
        reason: e.to_string(),
    })?;

    FieldMapping::from_tag(entity, &field_name, &tag)
}

/// The string literal of the field's `#[dao("...")]` attribute, if any.
fn read_annotation(entity: &str, field_name: &str, attrs: &[Attribute]) -> Result<Option<String>> {
    let malformed = |reason: String| Error::MalformedAnnotation {
        entity: entity.to_string(),
        field: field_name.to_string(),
        key: None,
        value: None,
        reason,
    };

    let mut annotations = attrs.iter().filter(|attr| attr.path().is_ident(ANNOTATION_ATTR));
    let Some(attr) = annotations.next() else {
        return Ok(None);
    };
    if annotations.next().is_some() {
        return Err(malformed(format!("more than one #[{ANNOTATION_ATTR}] attribute")));
    }

    let literal: LitStr = attr
        .parse_args()
        .map_err(|e| malformed(format!("expected #[{ANNOTATION_ATTR}(\"...\")]: {e}")))?;
    Ok(Some(literal.value()))
}
