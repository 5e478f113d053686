//! Vellum CLI - render, check and precompile multi-syntax templates

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;
mod util;

use util::ConfigOverrides;

#[derive(Parser)]
#[command(name = "vellum")]
#[command(author = "Vellum Contributors")]
#[command(version)]
#[command(about = "Render Jade, Mustache, Scaml and SSP templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./vellum.yaml when present)
    #[arg(short, long, global = true, env = "VELLUM_CONFIG")]
    config: Option<PathBuf>,

    /// Template root, overriding the configuration
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Scratch directory, overriding the configuration
    #[arg(long, global = true)]
    tmp_dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to stdout
    Render {
        /// Template identifier, relative to the template root
        #[arg(required_unless_present = "string")]
        identifier: Option<String>,

        /// Render this template source instead of a file
        #[arg(long, conflicts_with = "identifier")]
        string: Option<String>,

        /// Syntax of --string source (defaults to the configured syntax)
        #[arg(long, requires = "string")]
        syntax: Option<String>,

        /// Bind a template attribute (key=value, value parsed as JSON when possible)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Request locale, e.g. fr-FR
        #[arg(long)]
        locale: Option<String>,

        /// Render option (type=<syntax>, date=<strftime>, number=<digits>)
        #[arg(short = 'o', long = "option")]
        options: Vec<String>,

        /// Render precompiled units only
        #[arg(long)]
        production: bool,

        /// Load precompiled units from a `vellum precompile` output directory
        #[arg(long)]
        units: Option<PathBuf>,

        /// Action name exposed as helper.name
        #[arg(long, default_value = "cli")]
        action: String,
    },

    /// Compile every template below the template root and report syntax errors
    Check,

    /// Write generated code and a unit registration module
    Precompile {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print the precompiled unit name of template identifiers
    UnitName {
        /// Template identifiers
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let production = matches!(cli.command, Commands::Render { production: true, .. });
    let overrides = ConfigOverrides {
        config: cli.config.as_deref(),
        root: cli.root.as_deref(),
        tmp_dir: cli.tmp_dir.as_deref(),
        production,
    };

    let result = match cli.command {
        Commands::Render {
            identifier,
            string,
            syntax,
            set,
            locale,
            options,
            production: _,
            units,
            action,
        } => commands::render::run(
            &overrides,
            commands::render::RenderArgs {
                identifier: identifier.as_deref(),
                string: string.as_deref(),
                syntax: syntax.as_deref(),
                set: &set,
                locale: locale.as_deref(),
                options: &options,
                units: units.as_deref(),
                action: &action,
            },
        ),

        Commands::Check => commands::check::run(&overrides),

        Commands::Precompile { out } => commands::precompile::run(&overrides, &out),

        Commands::UnitName { identifiers } => commands::unit_name::run(&identifiers),
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
