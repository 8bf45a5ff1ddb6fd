mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::{Color, Colorize, control::ShouldColorize};
use std::fmt::Write;

use commands::{
    generate::{GenerateArgs, handle_generate},
    imports::{ImportsArgs, handle_imports},
    inspect::{InspectArgs, handle_inspect},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

#[derive(Parser)]
#[command(name = "daogen")]
#[command(version)]
#[command(
    about = "Data-access module generator for annotated entity structs",
    long_about = r#"Generates a data-access module for one entity struct from the
#[dao("...")] annotations on its fields:

• INSERT / UPDATE / DELETE statements with bind order
• Import resolution, aliasing the entity's module when needed
• A formatted <entity>_dao.rs module built on sqlx

Commands:
  generate  Write the DAO module for an entity
  inspect   Show the column mapping and statements
  imports   Show the import groups of the DAO module
"#
)]
#[command(after_long_help = "Environment:\n  RUST_LOG  Log filter for diagnostics, e.g. daogen=debug\n\n\
Defaults are read from daogen.toml next to the nearest Cargo.toml; flags override them.")]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse arguments with themed help and per-command examples. Clap
    /// prints help, version and usage errors itself and exits.
    fn parse_themed() -> Self {
        let use_color = ShouldColorize::from_env().should_colorize();
        let mut command = Cli::command()
            .styles(THEME.help_styles())
            .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });
        for example in command_examples() {
            command = command.mut_subcommand(example.name, |sub| {
                sub.after_long_help(render_examples(example.groups, use_color))
            });
        }

        let matches = command.get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let paint = |text: &str, color: Color, bold: bool| match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    };

    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", paint("Examples:", THEME.heading, true));
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        let _ = writeln!(buffer, "  {}", paint(group.title, THEME.primary, true));
        for command in group.commands {
            let arrow = paint(ICONS.arrow, THEME.muted, false);
            let _ = writeln!(buffer, "    {arrow} {}", paint(*command, THEME.key, false));
        }
    }
    buffer
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the DAO module for an entity
    Generate(GenerateArgs),

    /// Show the column mapping and SQL statements of an entity
    Inspect(InspectArgs),

    /// Show the imports the DAO module needs
    Imports(ImportsArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_themed();

    if let Err(err) = execute(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);

    let result = match cli.command {
        Commands::Generate(args) => handle_generate(args, &output),
        Commands::Inspect(args) => handle_inspect(args, &output),
        Commands::Imports(args) => handle_imports(args, &output),
    };

    if let Err(err) = &result {
        output.verbose(&format!("{err:?}"));
    }
    result
}
