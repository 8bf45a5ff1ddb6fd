//! Build-script driver for the DAO pipeline.

use anyhow::{Context, Result};
use daogen::{DaoRequest, DaogenConfig, GeneratedDao};
use std::fs;
use std::path::{Path, PathBuf};

/// One entity to generate a DAO for.
#[derive(Debug, Clone)]
struct EntityTarget {
    name: String,
    table: String,
}

/// Builder for configuring and running DAO generation from `build.rs`.
pub struct DaoGenerator {
    search_root: PathBuf,
    output_dir: PathBuf,
    entities: Vec<EntityTarget>,
    alias: Option<String>,
    file_suffix: Option<String>,
    exclude: Vec<String>,
    mod_file: bool,
    config: Option<DaogenConfig>,
}

impl DaoGenerator {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            search_root: PathBuf::from("src/"),
            output_dir: PathBuf::from("src/dao"),
            entities: Vec::new(),
            alias: None,
            file_suffix: None,
            exclude: Vec::new(),
            mod_file: false,
            config: None,
        }
    }

    /// Add an entity and the table it is stored in.
    ///
    /// Can be called multiple times; each entity gets its own file.
    pub fn entity(mut self, name: impl Into<String>, table: impl Into<String>) -> Self {
        self.entities.push(EntityTarget {
            name: name.into(),
            table: table.into(),
        });
        self
    }

    /// Set the tree searched for entity declarations.
    ///
    /// Default: `src/`
    pub fn search_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_root = path.into();
        self
    }

    /// Set the directory generated modules are written to.
    ///
    /// Default: `src/dao`
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Set the alias used for the entity's module.
    ///
    /// Default: `model`
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the suffix of generated file names.
    ///
    /// Default: `_dao`
    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = Some(suffix.into());
        self
    }

    /// Skip a directory name while searching.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    /// Also write a `mod.rs` declaring every generated module.
    ///
    /// Only useful when the output directory holds nothing else.
    pub fn mod_file(mut self, enabled: bool) -> Self {
        self.mod_file = enabled;
        self
    }

    /// Take defaults from a loaded `daogen.toml`. Explicit builder values win.
    pub fn config(mut self, config: DaogenConfig) -> Self {
        self.config = Some(config);
        self
    }

    fn request(&self, target: &EntityTarget, search_root: &Path, output_dir: &Path) -> DaoRequest {
        let config = self.config.clone().unwrap_or_default();
        let alias = self.alias.clone().unwrap_or(config.generator.alias);
        let file_suffix = self.file_suffix.clone().unwrap_or(config.generator.file_suffix);

        config
            .locator
            .exclude
            .iter()
            .chain(&self.exclude)
            .fold(
                DaoRequest::new(search_root, &target.name, &target.table, output_dir)
                    .alias(alias)
                    .file_suffix(file_suffix),
                |request, name| request.exclude(name),
            )
    }

    /// Run the generator.
    ///
    /// Generates one module per entity and writes the ones whose content
    /// changed. Returns the paths of all generated modules.
    pub fn run(self) -> Result<Vec<PathBuf>> {
        let search_root = std::path::absolute(&self.search_root)
            .with_context(|| format!("Failed to resolve {}", self.search_root.display()))?;
        let output_dir = std::path::absolute(&self.output_dir)
            .with_context(|| format!("Failed to resolve {}", self.output_dir.display()))?;

        let mut generated = Vec::with_capacity(self.entities.len());
        for target in &self.entities {
            let request = self.request(target, &search_root, &output_dir);
            let dao = daogen::generate(&request)
                .with_context(|| format!("Failed to generate DAO for `{}`", target.name))?;
            write_dao(&dao)?;
            generated.push(dao);
        }

        if self.mod_file && !generated.is_empty() {
            write_mod_file(&output_dir, &generated)?;
        }

        Ok(generated.into_iter().map(|dao| dao.path).collect())
    }
}

impl Default for DaoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn write_dao(dao: &GeneratedDao) -> Result<()> {
    // Only write if content has changed (avoids unnecessary recompilation)
    let written = dao
        .write_if_changed()
        .with_context(|| format!("Failed to write {}", dao.path.display()))?;
    if written {
        eprintln!(
            "daogen-build: Generated {} with {} fields",
            dao.path.display(),
            dao.mapping.fields.len()
        );
    }
    Ok(())
}

fn mod_file_content(generated: &[GeneratedDao]) -> String {
    let mut modules: Vec<&str> = generated
        .iter()
        .filter_map(|dao| dao.path.file_stem().and_then(|s| s.to_str()))
        .collect();
    modules.sort_unstable();
    modules.dedup();

    let mut content = String::from("//! Auto-generated module. Do not edit manually.\n\n");
    for module in modules {
        content.push_str(&format!("pub mod {module};\n"));
    }
    content
}

fn write_mod_file(output_dir: &Path, generated: &[GeneratedDao]) -> Result<()> {
    let mod_file = output_dir.join("mod.rs");
    let mod_content = mod_file_content(generated);

    let should_write = match fs::read_to_string(&mod_file) {
        Ok(existing) => existing != mod_content,
        Err(_) => true,
    };

    if should_write {
        fs::write(&mod_file, &mod_content).with_context(|| format!("Failed to write {}", mod_file.display()))?;
        eprintln!("daogen-build: Generated {}", mod_file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PERSON: &str = r##"
pub struct Person {
    #[dao(r#"column:"id" identity:"true""#)]
    pub id: i64,
    #[dao(r#"column:"name""#)]
    pub name: String,
}
"##;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("Cargo.toml"),
            "[package]\nname = \"shop\"\nversion = \"0.1.0\"\nedition = \"2024\"\n",
        )
        .unwrap();
        let dto = temp.path().join("src").join("dto");
        fs::create_dir_all(&dto).unwrap();
        fs::write(temp.path().join("src").join("lib.rs"), "pub mod dto;\n").unwrap();
        fs::write(dto.join("mod.rs"), "pub mod person;\n").unwrap();
        fs::write(dto.join("person.rs"), PERSON).unwrap();
        temp
    }

    #[test]
    fn test_generates_and_skips_unchanged() {
        let temp = project();
        let output_dir = temp.path().join("src").join("dao");

        let generator = || {
            DaoGenerator::new()
                .search_root(temp.path().join("src"))
                .output_dir(&output_dir)
                .entity("Person", "people")
                .mod_file(true)
        };

        let paths = generator().run().unwrap();
        assert_eq!(paths, vec![output_dir.join("person_dao.rs")]);

        let code = fs::read_to_string(&paths[0]).unwrap();
        assert!(code.contains("use crate::dto::person as model;"));
        assert!(code.contains("INSERT INTO people (name) VALUES (?)"));

        let mod_rs = fs::read_to_string(output_dir.join("mod.rs")).unwrap();
        assert!(mod_rs.contains("pub mod person_dao;"));

        let modified = fs::metadata(&paths[0]).unwrap().modified().unwrap();
        generator().run().unwrap();
        assert_eq!(fs::metadata(&paths[0]).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let temp = project();
        let mut config = DaogenConfig::default();
        config.generator.alias = "entities".to_string();
        config.generator.file_suffix = "_repo".to_string();

        let paths = DaoGenerator::new()
            .search_root(temp.path().join("src"))
            .output_dir(temp.path().join("src").join("storage"))
            .entity("Person", "people")
            .config(config)
            .alias("dto")
            .run()
            .unwrap();

        assert!(paths[0].ends_with("person_repo.rs"));
        let code = fs::read_to_string(&paths[0]).unwrap();
        assert!(code.contains("use crate::dto::person as dto;"));
        assert!(!temp.path().join("src").join("storage").join("mod.rs").exists());
    }

    #[test]
    fn test_missing_entity_fails() {
        let temp = project();
        let err = DaoGenerator::new()
            .search_root(temp.path().join("src"))
            .output_dir(temp.path().join("src").join("dao"))
            .entity("Invoice", "invoices")
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("Invoice"));
    }

    #[test]
    fn test_mod_file_content_is_sorted() {
        let temp = project();
        let paths = DaoGenerator::new()
            .search_root(temp.path().join("src"))
            .output_dir(temp.path().join("src").join("dao"))
            .entity("Person", "people")
            .entity("Person", "archived_people")
            .mod_file(true)
            .run()
            .unwrap();
        assert_eq!(paths.len(), 2);
        let mod_rs = fs::read_to_string(temp.path().join("src").join("dao").join("mod.rs")).unwrap();
        assert_eq!(mod_rs.matches("pub mod person_dao;").count(), 1);
    }
}
