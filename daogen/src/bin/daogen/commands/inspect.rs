use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use daogen::{EntityMapping, Statements};
use serde::Serialize;

use super::{EntityArgs, build_request, yes_no};
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect",
    commands: &[
        "daogen inspect -s Person -t people                    # Column mapping and SQL",
        "daogen --output json inspect -s Person -t people      # Mapping and statements as JSON",
        "daogen --output compact inspect -s Person -t people   # One line per entity",
    ],
}];

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub entity: EntityArgs,

    /// Table the entity is stored in
    #[arg(short = 't', long)]
    pub table: String,
}

#[derive(Serialize)]
struct InspectReport {
    entity: String,
    mapping: EntityMapping,
    statements: Statements,
}

impl TableDisplay for InspectReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Field", "Column", "Identity", "Insertable", "Updatable"]);
        for field in &self.mapping.fields {
            table.add_row(vec![
                Cell::new(&field.field_name),
                Cell::new(&field.column_name),
                Cell::new(yes_no(field.is_identity)),
                Cell::new(yes_no(field.is_insertable)),
                Cell::new(yes_no(field.is_updatable)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let columns: Vec<String> = self
            .mapping
            .fields
            .iter()
            .map(|f| {
                if f.is_identity {
                    format!("{}*", f.column_name)
                } else {
                    f.column_name.clone()
                }
            })
            .collect();
        format!("{} {} {}", self.entity, self.mapping.table_name, columns.join(","))
    }
}

pub fn handle_inspect(args: InspectArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let request = build_request(&ctx, &args.entity, &args.table, std::path::Path::new("."), output)?;

    let (mapping, statements) =
        daogen::generate::extract(&request).with_context(|| format!("Failed to inspect `{}`", request.entity))?;

    output.heading(&format!("{} ({})", request.entity, mapping.table_name));
    let report = InspectReport {
        entity: request.entity.clone(),
        mapping,
        statements,
    };
    output.display(&report)?;

    if !output.options.quiet && output.options.output_format == crate::output::OutputFormat::Table {
        output.heading("Statements");
        output.key_value("INSERT", &report.statements.insert.sql);
        if report.statements.is_keyed() {
            output.key_value("UPDATE", &report.statements.update);
            output.key_value("DELETE", &report.statements.delete);
        } else {
            output.warning("No identity field: UPDATE and DELETE have no predicate");
        }
        output.key_value("Bind order", &report.statements.insert.bind_fields.join(", "));
    }
    Ok(())
}
