//! Build plan resolution.
//!
//! Resolving a package name into a [`BuildPlan`] is read-only: it scans
//! source trees and checks every collision rule, but writes nothing. A build
//! only touches the filesystem once its plan is known to be valid.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::error::{ComposeError, ComposeResult};
use super::walk::scan_source;
use crate::manifest::{Manifest, ManifestError, PackageDecl, PackageKind};
use crate::package::{CompositePackage, DestinationRule, PackageSpec};

/// One file a build will install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Leaf package the file comes from.
    pub package: String,

    /// Absolute source path.
    pub source: PathBuf,

    /// Destination relative to the output root.
    pub destination: PathBuf,
}

/// The resolved contents of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Requested package (after alias resolution).
    pub package: String,

    /// Leaf or composite.
    pub kind: PackageKind,

    /// Files to install, sorted by destination.
    pub files: Vec<PlannedFile>,
}

impl BuildPlan {
    /// Names of the leaf packages contributing files, sorted and deduplicated.
    pub fn leaf_packages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.iter().map(|f| f.package.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Resolve `name` against `manifest`.
///
/// # Errors
///
/// - [`ComposeError::UnknownPackage`] if `name` is not declared
/// - [`ComposeError::EmptyPackage`] if a leaf selects no files
/// - [`ComposeError::DestinationCollision`] if a leaf maps two files to one path
/// - [`ComposeError::CompositeConflict`] if two leaves of a composite claim one path
/// - [`ComposeError::InvalidManifest`] on cycles or unknown members
pub fn resolve(manifest: &Manifest, name: &str) -> ComposeResult<BuildPlan> {
    let resolved = manifest.resolve_name(name);
    let decl = manifest
        .declared(resolved)
        .ok_or_else(|| ComposeError::UnknownPackage {
            name: name.to_string(),
            known: manifest.names().map(str::to_string).collect(),
        })?;

    let mut chain = Vec::new();
    let files = resolve_decl(manifest, decl, &mut chain)?;

    Ok(BuildPlan {
        package: resolved.to_string(),
        kind: decl.kind(),
        files,
    })
}

fn resolve_decl(
    manifest: &Manifest,
    decl: &PackageDecl,
    chain: &mut Vec<String>,
) -> ComposeResult<Vec<PlannedFile>> {
    match decl {
        PackageDecl::Leaf(spec) => plan_leaf(spec),
        PackageDecl::Composite(composite) => plan_composite(manifest, composite, chain),
    }
}

fn plan_leaf(spec: &PackageSpec) -> ComposeResult<Vec<PlannedFile>> {
    if !spec.destination.is_contained() {
        let DestinationRule::Flatten { dir } = spec.destination.clone();
        return Err(ManifestError::UnsafeDestination {
            package: spec.name.clone(),
            dir,
        }
        .into());
    }

    let mut planned: BTreeMap<PathBuf, PlannedFile> = BTreeMap::new();

    let sources =
        scan_source(&spec.source_dir, &spec.selector).map_err(|e| e.in_package(&spec.name))?;

    for source in sources {
        let Some(destination) = spec.destination.destination(&source) else {
            continue;
        };

        match planned.entry(destination) {
            Entry::Occupied(existing) => {
                return Err(ComposeError::DestinationCollision {
                    package: spec.name.clone(),
                    destination: existing.key().clone(),
                    first: existing.get().source.clone(),
                    second: source,
                });
            }
            Entry::Vacant(slot) => {
                let destination = slot.key().clone();
                slot.insert(PlannedFile {
                    package: spec.name.clone(),
                    source,
                    destination,
                });
            }
        }
    }

    if planned.is_empty() {
        return Err(ComposeError::EmptyPackage {
            package: spec.name.clone(),
            source_dir: spec.source_dir.clone(),
            selector: spec.selector.to_string(),
        });
    }

    debug!(package = %spec.name, files = planned.len(), "Planned leaf package");
    Ok(planned.into_values().collect())
}

fn plan_composite(
    manifest: &Manifest,
    composite: &CompositePackage,
    chain: &mut Vec<String>,
) -> ComposeResult<Vec<PlannedFile>> {
    if let Some(start) = chain.iter().position(|n| *n == composite.name) {
        let mut cycle = chain[start..].to_vec();
        cycle.push(composite.name.clone());
        return Err(ManifestError::Cycle { chain: cycle }.into());
    }
    chain.push(composite.name.clone());

    let mut union: BTreeMap<PathBuf, PlannedFile> = BTreeMap::new();

    for member in &composite.members {
        let decl = manifest
            .declared(member)
            .ok_or_else(|| ManifestError::UnknownMember {
                composite: composite.name.clone(),
                member: member.clone(),
            })?;

        for file in resolve_decl(manifest, decl, chain)? {
            match union.entry(file.destination.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(file);
                }
                // The same leaf reached through two members contributes the
                // same files twice.
                Entry::Occupied(existing) if existing.get().package == file.package => {}
                Entry::Occupied(existing) => {
                    return Err(ComposeError::CompositeConflict {
                        composite: composite.name.clone(),
                        destination: file.destination,
                        first_package: existing.get().package.clone(),
                        second_package: file.package,
                    });
                }
            }
        }
    }

    chain.pop();

    debug!(package = %composite.name, files = union.len(), "Planned composite package");
    Ok(union.into_values().collect())
}
