//! Plan command: packages offered on each supported platform.

use super::common::ManifestArgs;
use crate::error::CliError;

/// Run the plan command.
pub fn run(manifest: &ManifestArgs) -> Result<(), CliError> {
    let composer = manifest.composer()?;

    for entry in composer.platform_plan() {
        let packages = if entry.packages.is_empty() {
            "(none)".to_string()
        } else {
            entry.packages.join(", ")
        };
        println!("{:<16} {}", entry.platform.as_str(), packages);
    }

    Ok(())
}
