use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use super::{EntityArgs, build_request, yes_no};
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Generate",
        commands: &[
            "daogen generate -s Person -t people -o src/storage    # Write src/storage/person_dao.rs",
            "daogen generate -s Person -t people -o src/dto        # DAO next to the entity, no alias",
        ],
    },
    ExampleGroup {
        title: "Preview",
        commands: &[
            "daogen generate -s Person -t people --dry-run         # Print the module instead of writing it",
            "daogen --output json generate -s Person -t people     # Machine-readable summary",
        ],
    },
];

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub entity: EntityArgs,

    /// Table the entity is stored in
    #[arg(short = 't', long)]
    pub table: String,

    /// Directory the DAO module is written to
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Suffix of the generated file name (overrides `file_suffix` in daogen.toml)
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Print the generated module instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct GenerateReport {
    entity: String,
    table: String,
    path: PathBuf,
    fields: usize,
    keyed: bool,
    alias_needed: bool,
    written: bool,
}

impl TableDisplay for GenerateReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Entity", "Table", "File", "Fields", "Keyed", "Written"]);
        table.add_row(vec![
            Cell::new(&self.entity),
            Cell::new(&self.table),
            Cell::new(self.path.display()),
            Cell::new(self.fields),
            Cell::new(yes_no(self.keyed)),
            Cell::new(yes_no(self.written)),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{} {} {} fields={} written={}",
            self.entity,
            self.table,
            self.path.display(),
            self.fields,
            self.written
        )
    }
}

pub fn handle_generate(args: GenerateArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let mut request = build_request(&ctx, &args.entity, &args.table, &args.output_dir, output)?;
    if let Some(suffix) = args.suffix {
        request = request.file_suffix(suffix);
    }

    let generated =
        daogen::generate(&request).with_context(|| format!("Failed to generate DAO for `{}`", request.entity))?;

    if generated.mapping.is_empty() {
        output.warning(&format!("`{}` has no #[dao] annotated fields", request.entity));
    } else if !generated.statements.is_keyed() {
        output.warning(&format!(
            "`{}` has no identity field, only `create` was generated",
            request.entity
        ));
    }

    if args.dry_run {
        print!("{}", generated.content);
        return Ok(());
    }

    let written = generated.write_if_changed()?;
    if written {
        output.success(&format!("{} Wrote {}", ICONS.file, generated.path.display()));
    } else {
        output.info(&format!("{} is up to date", generated.path.display()));
    }

    output.display(&GenerateReport {
        entity: request.entity.clone(),
        table: request.table.clone(),
        path: generated.path.clone(),
        fields: generated.mapping.fields.len(),
        keyed: generated.statements.is_keyed(),
        alias_needed: generated.imports.alias_needed,
        written,
    })
}
