//! Composite (meta) package type.

use std::fmt;

use semver::Version;

use super::core::PackageMetadata;

/// A package whose output is the union of other packages' outputs.
///
/// Composites never scan a source directory themselves. Members may be leaf
/// packages or other composites; a manifest rejects member graphs that
/// contain cycles.
///
/// # Example
///
/// ```
/// use semver::Version;
/// use fontpack::package::CompositePackage;
///
/// let all = CompositePackage::new("default", Version::new(1, 0, 0))
///     .with_member("custom-fast-fonts")
///     .with_member("original-fast-fonts");
///
/// assert_eq!(all.members, vec!["custom-fast-fonts", "original-fast-fonts"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositePackage {
    /// Unique package name within a manifest.
    pub name: String,

    /// Package version. Never compared or resolved.
    pub version: Version,

    /// Names of member packages, in declaration order.
    pub members: Vec<String>,

    /// Descriptive fields. Empty unless declared explicitly.
    pub metadata: PackageMetadata,
}

impl CompositePackage {
    /// Create a composite with no members.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            members: Vec::new(),
            metadata: PackageMetadata::default(),
        }
    }

    /// Append a member package name.
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl fmt::Display for CompositePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} [{}]",
            self.name,
            self.version,
            self.members.join(", ")
        )
    }
}
