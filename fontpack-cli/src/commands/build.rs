//! Build command: materialize a package under an output root.

use std::path::PathBuf;

use clap::Args;
use fontpack::composer::{BuildProgressCallback, BuildStage, PackageComposer};
use tracing::info;

use super::common::{format_size, ManifestArgs};
use crate::error::CliError;

/// Arguments for `fontpack build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Package to build (`all` builds the default package)
    pub package: String,

    /// Directory the package tree is written to
    pub output_root: PathBuf,

    /// Resolve the package and print what would be installed
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the build command.
pub fn run(args: BuildArgs, manifest: &ManifestArgs) -> Result<(), CliError> {
    let composer = manifest.composer()?;

    if args.dry_run {
        return print_plan(&composer, &args.package);
    }

    let progress: BuildProgressCallback = Box::new(|stage, progress, message| {
        if stage == BuildStage::Complete || progress >= 1.0 {
            info!(stage = stage.name(), "{}", message);
        }
    });

    let report = composer.build_with_progress(&args.package, &args.output_root, Some(progress))?;

    println!(
        "Built {} ({}) into {}",
        report.package,
        report.kind,
        report.output_root.display()
    );
    for file in &report.files {
        println!(
            "  {}  {}  [{}]",
            file.path.display(),
            format_size(file.size),
            file.package
        );
    }
    println!(
        "{} files, {}",
        report.files.len(),
        format_size(report.total_bytes)
    );

    Ok(())
}

fn print_plan(composer: &PackageComposer, package: &str) -> Result<(), CliError> {
    let plan = composer.plan(package)?;

    println!(
        "Would build {} ({}) from {}",
        plan.package,
        plan.kind,
        plan.leaf_packages().join(", ")
    );
    for file in &plan.files {
        println!(
            "  {} -> {}",
            file.source.display(),
            file.destination.display()
        );
    }
    println!("{} files", plan.file_count());

    Ok(())
}
