//! Package composer for building package trees.
//!
//! This module orchestrates the full build workflow:
//! 1. Resolve the requested package into a plan (read-only)
//! 2. Resolve the output root (following symlinks) and lock it
//! 3. Stage every planned file beside the output root
//! 4. Commit the staged tree into the output root
//! 5. Clean up the staging directory

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::Builder as TempBuilder;
use tracing::info;

use super::config::ComposerConfig;
use super::error::{ComposeError, ComposeResult};
use super::lock::{parent_dir, OutputLock};
use super::plan::{resolve, BuildPlan};
use super::stage::{commit, resolve_output_root, stage_files, InstalledFile};
use crate::manifest::{Manifest, PackageDecl, PackageKind, PlatformEntry};
use crate::package::Platform;

/// Progress callback for build operations.
///
/// # Arguments
///
/// * `stage` - Current build stage
/// * `progress` - Progress within the stage (0.0 - 1.0)
/// * `message` - Human-readable message
pub type BuildProgressCallback = Box<dyn Fn(BuildStage, f64, &str) + Send + Sync>;

/// Build stages for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Resolving the package into a plan.
    Resolving,
    /// Copying files into the staging tree.
    Staging,
    /// Moving the staging tree into the output root.
    Committing,
    /// Build complete.
    Complete,
}

impl BuildStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resolving => "Resolving",
            Self::Staging => "Staging",
            Self::Committing => "Committing",
            Self::Complete => "Complete",
        }
    }
}

/// Result of a package build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Package that was built (after alias resolution).
    pub package: String,
    /// Leaf or composite.
    pub kind: PackageKind,
    /// Root the tree was written to.
    pub output_root: PathBuf,
    /// Installed files, sorted by path.
    pub files: Vec<InstalledFile>,
    /// Total bytes copied.
    pub total_bytes: u64,
}

/// Describes one declared package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub kind: PackageKind,
    pub version: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    pub platforms: Vec<Platform>,
    /// Member names; empty for leaf packages.
    pub members: Vec<String>,
    /// Source directory; `None` for composites.
    pub source_dir: Option<PathBuf>,
}

impl PackageInfo {
    fn from_decl(decl: &PackageDecl) -> Self {
        let metadata = decl.metadata();
        let (members, source_dir) = match decl {
            PackageDecl::Leaf(spec) => (Vec::new(), Some(spec.source_dir.clone())),
            PackageDecl::Composite(composite) => (composite.members.clone(), None),
        };

        Self {
            name: decl.name().to_string(),
            kind: decl.kind(),
            version: decl.version().to_string(),
            description: metadata.description.clone(),
            homepage: metadata.homepage.clone(),
            license: metadata.license.clone(),
            platforms: metadata.platforms.platforms(),
            members,
            source_dir,
        }
    }
}

/// Package composer.
///
/// Resolves package names from a validated [`Manifest`] and materializes
/// them under an output root.
pub struct PackageComposer {
    manifest: Manifest,
    config: ComposerConfig,
}

impl PackageComposer {
    /// Create a composer, validating the manifest first.
    pub fn new(manifest: Manifest) -> ComposeResult<Self> {
        Self::with_config(manifest, ComposerConfig::default())
    }

    /// Create a composer with explicit configuration.
    pub fn with_config(manifest: Manifest, config: ComposerConfig) -> ComposeResult<Self> {
        manifest.validate()?;
        Ok(Self { manifest, config })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Describe every declared package, sorted by name.
    pub fn list(&self) -> Vec<PackageInfo> {
        self.manifest.packages().map(PackageInfo::from_decl).collect()
    }

    /// Describe one package.
    pub fn describe(&self, name: &str) -> ComposeResult<PackageInfo> {
        self.manifest
            .get(name)
            .map(PackageInfo::from_decl)
            .ok_or_else(|| self.unknown(name))
    }

    /// Packages offered on each supported platform.
    pub fn platform_plan(&self) -> Vec<PlatformEntry> {
        self.manifest.platform_plan()
    }

    /// Resolve a package without writing anything.
    pub fn plan(&self, name: &str) -> ComposeResult<BuildPlan> {
        resolve(&self.manifest, name)
    }

    /// Build a package into `output_root`.
    pub fn build(&self, name: &str, output_root: &Path) -> ComposeResult<BuildReport> {
        self.build_with_progress(name, output_root, None)
    }

    /// Build a package into `output_root`, reporting progress.
    ///
    /// Nothing is written unless the package resolves to a valid plan. A
    /// build that fails after resolution leaves the output root as it was,
    /// except when a failure interrupts the merge into an existing root.
    pub fn build_with_progress(
        &self,
        name: &str,
        output_root: &Path,
        on_progress: Option<BuildProgressCallback>,
    ) -> ComposeResult<BuildReport> {
        // Report progress helper
        let report = |stage: BuildStage, progress: f64, message: &str| {
            if let Some(ref cb) = on_progress {
                cb(stage, progress, message);
            }
        };

        // Stage 1: Resolve
        report(BuildStage::Resolving, 0.0, "Resolving package...");
        let plan = self.plan(name)?;
        report(
            BuildStage::Resolving,
            1.0,
            &format!("{} files from {}", plan.file_count(), plan.leaf_packages().join(", ")),
        );
        info!(
            package = %plan.package,
            files = plan.file_count(),
            output_root = %output_root.display(),
            "Building package"
        );

        let target = resolve_output_root(output_root)?;
        let parent = parent_dir(&target);
        fs::create_dir_all(parent).map_err(ComposeError::create_dir(parent))?;

        let files = if self.config.lock_output {
            let mut lock = OutputLock::open(&target)?;
            lock.with_exclusive(|| self.materialize(&plan, &target, &report))?
        } else {
            self.materialize(&plan, &target, &report)?
        };

        let total_bytes: u64 = files.iter().map(|f| f.size).sum();
        report(BuildStage::Complete, 1.0, "Build complete");
        info!(
            package = %plan.package,
            files = files.len(),
            bytes = total_bytes,
            "Package built"
        );

        Ok(BuildReport {
            package: plan.package,
            kind: plan.kind,
            output_root: output_root.to_path_buf(),
            files,
            total_bytes,
        })
    }

    /// Stage and commit a resolved plan.
    fn materialize(
        &self,
        plan: &BuildPlan,
        output_root: &Path,
        report: &dyn Fn(BuildStage, f64, &str),
    ) -> ComposeResult<Vec<InstalledFile>> {
        let parent = parent_dir(output_root);

        // Dropping the TempDir removes whatever is left of the staging tree.
        let staging = TempBuilder::new()
            .prefix(".fontpack-staging-")
            .tempdir_in(parent)
            .map_err(ComposeError::create_dir(parent))?;

        // Stage 2: Copy into staging
        report(
            BuildStage::Staging,
            0.0,
            &format!("Staging {} files...", plan.file_count()),
        );
        let files = stage_files(&plan.files, staging.path(), self.config.file_mode)?;
        report(BuildStage::Staging, 1.0, "Files staged");

        // Stage 3: Commit
        report(BuildStage::Committing, 0.0, "Committing to output root...");
        commit(staging.path(), output_root, &files, self.config.dir_mode)?;
        report(BuildStage::Committing, 1.0, "Committed");

        Ok(files)
    }

    fn unknown(&self, name: &str) -> ComposeError {
        ComposeError::UnknownPackage {
            name: name.to_string(),
            known: self.manifest.names().map(str::to_string).collect(),
        }
    }
}
