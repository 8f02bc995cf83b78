//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::Args;
use fontpack::composer::PackageComposer;
use fontpack::manifest::{Manifest, MANIFEST_FILE_NAME};
use tracing::debug;

use crate::error::CliError;

/// Where package declarations come from.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Manifest file (defaults to ./fontpack.ini when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Source directory of custom-fast-fonts when no manifest is used
    #[arg(long, global = true, value_name = "DIR", default_value = "fonts")]
    pub custom_dir: PathBuf,

    /// Source directory of original-fast-fonts when no manifest is used
    #[arg(long, global = true, value_name = "DIR", default_value = "original-fonts")]
    pub original_dir: PathBuf,
}

impl ManifestArgs {
    /// Resolve the manifest: explicit file, then ./fontpack.ini, then the
    /// built-in fast-fonts packages.
    pub fn load(&self) -> Result<Manifest, CliError> {
        if let Some(path) = &self.manifest {
            debug!(path = %path.display(), "Using manifest from --manifest");
            return Ok(Manifest::load(path)?);
        }

        let local = Path::new(MANIFEST_FILE_NAME);
        if local.is_file() {
            debug!(path = %local.display(), "Using manifest from current directory");
            return Ok(Manifest::load(local)?);
        }

        debug!(
            custom_dir = %self.custom_dir.display(),
            original_dir = %self.original_dir.display(),
            "Using built-in fast-fonts manifest"
        );
        Ok(Manifest::fast_fonts(&self.custom_dir, &self.original_dir))
    }

    /// Load the manifest and wrap it in a composer.
    pub fn composer(&self) -> Result<PackageComposer, CliError> {
        Ok(PackageComposer::new(self.load()?)?)
    }
}

/// Format a size in bytes as a human-readable string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
