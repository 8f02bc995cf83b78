//! Declared package table.
//!
//! A [`Manifest`] is the closed set of packages a build may request. It is
//! built once (from code or from an INI file), validated, and then only
//! read for the lifetime of a build.
//!
//! # Built-in manifest
//!
//! [`Manifest::fast_fonts`] declares the packages shipped by this project:
//!
//! | Name                  | Kind      | Contents                              |
//! |-----------------------|-----------|---------------------------------------|
//! | `custom-fast-fonts`   | leaf      | `*.ttf` under the custom font dir     |
//! | `original-fast-fonts` | leaf      | `*.ttf` under the third-party font dir|
//! | `default`             | composite | union of both                         |

mod error;
mod loader;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use semver::Version;
use serde::Serialize;

use crate::package::{CompositePackage, PackageMetadata, PackageSpec, Platform, PlatformSet};

pub use loader::MANIFEST_FILE_NAME;
pub use error::ManifestError;

/// Name accepted everywhere as an alias for the default package.
pub const ALL_ALIAS: &str = "all";

/// Conventional name of the composite of every shipped package.
pub const DEFAULT_PACKAGE: &str = "default";

/// Name of the package built from this project's own fonts.
pub const CUSTOM_FONTS_PACKAGE: &str = "custom-fast-fonts";

/// Name of the package built from the upstream Fast Font files.
pub const ORIGINAL_FONTS_PACKAGE: &str = "original-fast-fonts";

/// Whether a declaration is a leaf or a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Leaf,
    Composite,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => f.write_str("leaf"),
            Self::Composite => f.write_str("composite"),
        }
    }
}

/// A single declared package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageDecl {
    Leaf(PackageSpec),
    Composite(CompositePackage),
}

impl PackageDecl {
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(spec) => &spec.name,
            Self::Composite(pkg) => &pkg.name,
        }
    }

    pub fn version(&self) -> &Version {
        match self {
            Self::Leaf(spec) => &spec.version,
            Self::Composite(pkg) => &pkg.version,
        }
    }

    pub fn metadata(&self) -> &PackageMetadata {
        match self {
            Self::Leaf(spec) => &spec.metadata,
            Self::Composite(pkg) => &pkg.metadata,
        }
    }

    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Leaf(_) => PackageKind::Leaf,
            Self::Composite(_) => PackageKind::Composite,
        }
    }
}

/// Packages available on one target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    pub platform: Platform,
    pub packages: Vec<String>,
}

/// The closed set of declared packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    packages: BTreeMap<String, PackageDecl>,
    default_package: String,
}

impl Manifest {
    /// Create an empty manifest whose default package is `default_package`.
    pub fn new(default_package: impl Into<String>) -> Self {
        Self {
            packages: BTreeMap::new(),
            default_package: default_package.into(),
        }
    }

    /// The project's own manifest.
    ///
    /// `custom_dir` holds the fonts generated by this project and
    /// `original_dir` the upstream Fast Font files.
    pub fn fast_fonts(custom_dir: impl Into<PathBuf>, original_dir: impl Into<PathBuf>) -> Self {
        let version = Version::new(1, 0, 0);

        let custom = PackageSpec::fonts(CUSTOM_FONTS_PACKAGE, version.clone(), custom_dir)
            .with_metadata(
                PackageMetadata::described("Fast Font variants for speed reading")
                    .with_platforms(PlatformSet::All),
            );

        let original = PackageSpec::fonts(ORIGINAL_FONTS_PACKAGE, version.clone(), original_dir)
            .with_metadata(
                PackageMetadata::described("Original Fast Font files by Born2Root")
                    .with_homepage("https://github.com/Born2Root/Fast-Font")
                    .with_platforms(PlatformSet::All),
            );

        let default = CompositePackage::new(DEFAULT_PACKAGE, version)
            .with_member(CUSTOM_FONTS_PACKAGE)
            .with_member(ORIGINAL_FONTS_PACKAGE);

        Self::new(DEFAULT_PACKAGE)
            .with_leaf(custom)
            .with_leaf(original)
            .with_composite(default)
    }

    /// Add a leaf package, replacing any package with the same name.
    pub fn with_leaf(mut self, spec: PackageSpec) -> Self {
        self.packages
            .insert(spec.name.clone(), PackageDecl::Leaf(spec));
        self
    }

    /// Add a composite package, replacing any package with the same name.
    pub fn with_composite(mut self, composite: CompositePackage) -> Self {
        self.packages
            .insert(composite.name.clone(), PackageDecl::Composite(composite));
        self
    }

    /// Add a package, failing if the name is already taken.
    pub fn insert(&mut self, decl: PackageDecl) -> Result<(), ManifestError> {
        let name = decl.name().to_string();
        if name == ALL_ALIAS {
            return Err(ManifestError::ReservedName(name));
        }
        if self.packages.contains_key(&name) {
            return Err(ManifestError::DuplicatePackage(name));
        }
        self.packages.insert(name, decl);
        Ok(())
    }

    /// Name of the package built when none is requested.
    pub fn default_package(&self) -> &str {
        &self.default_package
    }

    /// Map the `all` alias to the default package name.
    pub fn resolve_name<'a>(&'a self, name: &'a str) -> &'a str {
        if name == ALL_ALIAS {
            &self.default_package
        } else {
            name
        }
    }

    /// Look up a package by name, honoring the `all` alias.
    pub fn get(&self, name: &str) -> Option<&PackageDecl> {
        self.packages.get(self.resolve_name(name))
    }

    /// Look up a package by its exact declared name.
    pub fn declared(&self, name: &str) -> Option<&PackageDecl> {
        self.packages.get(name)
    }

    /// All declarations, sorted by name.
    pub fn packages(&self) -> impl Iterator<Item = &PackageDecl> {
        self.packages.values()
    }

    /// All package names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Check the manifest's structural invariants.
    ///
    /// - no package is named `all`
    /// - the default package is declared
    /// - every composite has at least one member
    /// - every member names a declared package
    /// - no composite transitively includes itself
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.packages.contains_key(ALL_ALIAS) {
            return Err(ManifestError::ReservedName(ALL_ALIAS.to_string()));
        }
        if !self.packages.contains_key(&self.default_package) {
            return Err(ManifestError::MissingDefault(self.default_package.clone()));
        }

        for decl in self.packages.values() {
            if let PackageDecl::Composite(composite) = decl {
                if composite.members.is_empty() {
                    return Err(ManifestError::EmptyComposite(composite.name.clone()));
                }
                for member in &composite.members {
                    if !self.packages.contains_key(member) {
                        return Err(ManifestError::UnknownMember {
                            composite: composite.name.clone(),
                            member: member.clone(),
                        });
                    }
                }
            }
        }

        let mut finished = HashSet::new();
        for name in self.packages.keys() {
            let mut chain = Vec::new();
            self.check_acyclic(name, &mut chain, &mut finished)?;
        }

        Ok(())
    }

    /// Depth-first walk of composite membership.
    ///
    /// `chain` holds the names on the current path; `finished` holds names
    /// whose whole subgraph is already known to be acyclic.
    fn check_acyclic<'a>(
        &'a self,
        name: &'a str,
        chain: &mut Vec<&'a str>,
        finished: &mut HashSet<&'a str>,
    ) -> Result<(), ManifestError> {
        if finished.contains(name) {
            return Ok(());
        }
        if let Some(start) = chain.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = chain[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(ManifestError::Cycle { chain: cycle });
        }

        if let Some(PackageDecl::Composite(composite)) = self.packages.get(name) {
            chain.push(name);
            for member in &composite.members {
                self.check_acyclic(member, chain, finished)?;
            }
            chain.pop();
        }

        finished.insert(name);
        Ok(())
    }

    /// For each supported platform, the packages offered on it.
    ///
    /// This is the data-driven build table: the declared packages are
    /// iterated once per platform instead of being repeated per platform.
    pub fn platform_plan(&self) -> Vec<PlatformEntry> {
        Platform::ALL
            .into_iter()
            .map(|platform| PlatformEntry {
                platform,
                packages: self
                    .packages
                    .values()
                    .filter(|decl| decl.metadata().platforms.supports(platform))
                    .map(|decl| decl.name().to_string())
                    .collect(),
            })
            .collect()
    }
}
