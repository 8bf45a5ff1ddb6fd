use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use daogen::ImportGroups;
use serde::Serialize;

use super::{EntityArgs, build_request, yes_no};
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Imports",
    commands: &[
        "daogen imports -s Person -o src/storage               # Imports of src/storage/person_dao.rs",
        "daogen imports -s Person -o src/storage --alias dto   # Alias the entity module as `dto`",
    ],
}];

#[derive(Args, Debug)]
pub struct ImportsArgs {
    #[command(flatten)]
    pub entity: EntityArgs,

    /// Directory the DAO module would be written to
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Serialize)]
struct ImportsReport {
    entity: String,
    home_module: String,
    output_module: String,
    alias_needed: bool,
    alias: String,
    #[serde(flatten)]
    groups: ImportGroups,
}

impl TableDisplay for ImportsReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Group", "Path"]);
        for path in &self.groups.standard {
            table.add_row(vec![Cell::new("standard"), Cell::new(path)]);
        }
        for path in &self.groups.external {
            table.add_row(vec![Cell::new("external"), Cell::new(path)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let all: Vec<&str> = self.groups.iter().collect();
        format!("{} alias_needed={} {}", self.entity, self.alias_needed, all.join(";"))
    }
}

pub fn handle_imports(args: ImportsArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    // the table name plays no part in import resolution
    let request = build_request(&ctx, &args.entity, "", &args.output_dir, output)?;

    let resolved = daogen::generate::resolve(&request)
        .with_context(|| format!("Failed to resolve imports for `{}`", request.entity))?;

    output.key_value("Entity module", &resolved.home_module.path());
    output.key_value("Output module", &resolved.output_module.path());
    output.key_value("Alias needed", yes_no(resolved.alias_needed));

    output.display(&ImportsReport {
        entity: request.entity.clone(),
        home_module: resolved.home_module.path(),
        output_module: resolved.output_module.path(),
        alias_needed: resolved.alias_needed,
        alias: resolved.alias.clone(),
        groups: resolved.groups(),
    })
}
