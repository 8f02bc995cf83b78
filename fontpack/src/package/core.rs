//! Leaf package type.
//!
//! The [`PackageSpec`] struct describes one installable unit: where its files
//! come from, which of them belong to it, and where they land in the output.

use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;

use super::layout::DestinationRule;
use super::platform::PlatformSet;
use super::selector::Selector;

/// Descriptive package fields.
///
/// Metadata is informational only. It is surfaced by `describe` and never
/// checked against the files being packaged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    /// One-line package description.
    pub description: Option<String>,

    /// Project homepage URL.
    pub homepage: Option<String>,

    /// License identifier (e.g., "MIT", "OFL-1.1").
    pub license: Option<String>,

    /// Platforms the package is offered on.
    pub platforms: PlatformSet,
}

impl PackageMetadata {
    /// Create metadata with a description and all other fields empty.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Set the homepage URL.
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Set the license identifier.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Set the supported platforms.
    pub fn with_platforms(mut self, platforms: PlatformSet) -> Self {
        self.platforms = platforms;
        self
    }
}

/// A leaf package scanned from a source directory.
///
/// # Example
///
/// ```
/// use semver::Version;
/// use fontpack::package::PackageSpec;
///
/// let spec = PackageSpec::fonts("custom-fast-fonts", Version::new(1, 0, 0), "fonts");
///
/// assert_eq!(spec.name, "custom-fast-fonts");
/// assert_eq!(spec.source_dir.to_str(), Some("fonts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Unique package name within a manifest.
    pub name: String,

    /// Package version. Never compared or resolved.
    pub version: Version,

    /// Directory tree holding candidate files.
    pub source_dir: PathBuf,

    /// Predicate choosing which files belong to the package.
    pub selector: Selector,

    /// Maps each selected file to its path under the output root.
    pub destination: DestinationRule,

    /// Descriptive fields.
    pub metadata: PackageMetadata,
}

impl PackageSpec {
    /// Create a TrueType font package.
    ///
    /// Selects `*.ttf` files recursively and flattens them into
    /// `share/fonts/truetype`.
    pub fn fonts(name: impl Into<String>, version: Version, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version,
            source_dir: source_dir.into(),
            selector: Selector::truetype(),
            destination: DestinationRule::truetype(),
            metadata: PackageMetadata::default(),
        }
    }

    /// Replace the selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the destination rule.
    pub fn with_destination(mut self, destination: DestinationRule) -> Self {
        self.destination = destination;
        self
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Resolve a relative source directory against `base`.
    ///
    /// Absolute source directories are left untouched.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.source_dir.is_relative() {
            self.source_dir = base.join(&self.source_dir);
        }
        self
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Platform;

    #[test]
    fn test_fonts_defaults() {
        let spec = PackageSpec::fonts("a", Version::new(1, 0, 0), "src");

        assert_eq!(spec.selector, Selector::truetype());
        assert_eq!(spec.destination, DestinationRule::truetype());
        assert_eq!(spec.metadata, PackageMetadata::default());
    }

    #[test]
    fn test_display() {
        let spec = PackageSpec::fonts("custom-fast-fonts", Version::new(1, 2, 3), "src");
        assert_eq!(spec.to_string(), "custom-fast-fonts v1.2.3");
    }

    #[test]
    fn test_rooted_at_relative() {
        let spec = PackageSpec::fonts("a", Version::new(1, 0, 0), "fonts")
            .rooted_at(Path::new("/repo"));
        assert_eq!(spec.source_dir, PathBuf::from("/repo/fonts"));
    }

    #[test]
    fn test_rooted_at_absolute_untouched() {
        let spec = PackageSpec::fonts("a", Version::new(1, 0, 0), "/opt/fonts")
            .rooted_at(Path::new("/repo"));
        assert_eq!(spec.source_dir, PathBuf::from("/opt/fonts"));
    }

    #[test]
    fn test_metadata_builder() {
        let meta = PackageMetadata::described("Fast reading fonts")
            .with_homepage("https://example.com")
            .with_license("MIT")
            .with_platforms(PlatformSet::only([Platform::X86_64Linux]));

        assert_eq!(meta.description.as_deref(), Some("Fast reading fonts"));
        assert_eq!(meta.homepage.as_deref(), Some("https://example.com"));
        assert_eq!(meta.license.as_deref(), Some("MIT"));
        assert!(meta.platforms.supports(Platform::X86_64Linux));
        assert!(!meta.platforms.supports(Platform::Aarch64Darwin));
    }
}
