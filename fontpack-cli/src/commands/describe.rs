//! Describe command: show one package's metadata.

use clap::Args;

use super::common::ManifestArgs;
use crate::error::CliError;

/// Arguments for `fontpack describe`.
#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Package to describe
    pub package: String,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the describe command.
pub fn run(args: DescribeArgs, manifest: &ManifestArgs) -> Result<(), CliError> {
    let info = manifest.composer()?.describe(&args.package)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} v{} ({})", info.name, info.version, info.kind);
    if let Some(description) = &info.description {
        println!("  Description: {}", description);
    }
    if let Some(homepage) = &info.homepage {
        println!("  Homepage:    {}", homepage);
    }
    if let Some(license) = &info.license {
        println!("  License:     {}", license);
    }
    let platforms: Vec<&str> = info.platforms.iter().map(|p| p.as_str()).collect();
    println!("  Platforms:   {}", platforms.join(", "));
    if let Some(source_dir) = &info.source_dir {
        println!("  Source:      {}", source_dir.display());
    }
    if !info.members.is_empty() {
        println!("  Members:     {}", info.members.join(", "));
    }

    Ok(())
}
