pub mod generate;
pub mod imports;
pub mod inspect;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use daogen::DaoRequest;

use crate::context::ProjectContext;
use crate::output::OutputManager;

/// Arguments naming the entity and where to look for it
#[derive(Args, Clone, Debug)]
pub struct EntityArgs {
    /// Name of the entity struct
    #[arg(short = 's', long = "struct", value_name = "NAME")]
    pub entity: String,

    /// Directory searched for the entity (overrides `search_root` in daogen.toml)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Extra directory names to skip while searching
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Alias for the entity's module when it has to be imported
    #[arg(long, value_name = "IDENT")]
    pub alias: Option<String>,
}

/// Merge CLI flags over the project configuration.
pub fn build_request(
    ctx: &ProjectContext,
    args: &EntityArgs,
    table: &str,
    output_dir: &Path,
    output: &OutputManager,
) -> Result<DaoRequest> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let root = match &args.root {
        Some(root) => cwd.join(root),
        None => ctx.search_root(),
    };
    let alias = args.alias.as_deref().unwrap_or(&ctx.config.generator.alias);

    let request = ctx
        .config
        .locator
        .exclude
        .iter()
        .chain(&args.exclude)
        .fold(
            DaoRequest::new(&root, &args.entity, table, cwd.join(output_dir))
                .alias(alias)
                .file_suffix(&ctx.config.generator.file_suffix),
            |request, name| request.exclude(name),
        );

    if ctx.has_config_file() {
        output.verbose(&format!("Using {}", ctx.config_path.display()));
    }
    output.verbose(&format!("Searching {} for `{}`", root.display(), args.entity));
    Ok(request)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
