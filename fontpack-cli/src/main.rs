//! fontpack CLI - Command-line interface
//!
//! Builds installable font trees from the packages declared in a manifest.

mod commands;
mod error;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fontpack::logging::{init_logging, LogLevel};

use commands::build::BuildArgs;
use commands::common::ManifestArgs;
use commands::describe::DescribeArgs;
use commands::list::ListArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "fontpack", version, about = "Build installable font packages")]
struct Cli {
    #[command(flatten)]
    manifest: ManifestArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a package into an output root
    Build(BuildArgs),
    /// List declared packages
    List(ListArgs),
    /// Show a package's metadata
    Describe(DescribeArgs),
    /// Show which packages are offered on each platform
    Plan,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _logging = init_logging(LogLevel::from_flags(cli.quiet, cli.verbose))?;

    match cli.command {
        Commands::Build(args) => commands::build::run(args, &cli.manifest),
        Commands::List(args) => commands::list::run(args, &cli.manifest),
        Commands::Describe(args) => commands::describe::run(args, &cli.manifest),
        Commands::Plan => commands::plan::run(&cli.manifest),
    }
}
