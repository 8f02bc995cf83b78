//! List command: show every declared package.

use clap::Args;

use super::common::ManifestArgs;
use crate::error::CliError;

/// Arguments for `fontpack list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the list command.
pub fn run(args: ListArgs, manifest: &ManifestArgs) -> Result<(), CliError> {
    let composer = manifest.composer()?;
    let packages = composer.list();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    let default = composer.manifest().default_package();
    for info in &packages {
        let marker = if info.name == default { "*" } else { " " };
        println!(
            "{} {:<24} {:<10} v{:<8} {}",
            marker,
            info.name,
            info.kind.to_string(),
            info.version,
            info.description.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
