//! Manifest errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read or parsed.
    #[error("failed to load manifest {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// The manifest text is not valid INI.
    #[error("invalid manifest syntax: {0}")]
    Syntax(#[from] ini::ParseError),

    /// A section name is neither `fontpack`, `package.<name>` nor
    /// `composite.<name>`.
    #[error("unknown manifest section [{0}]")]
    UnknownSection(String),

    /// A required key is missing from a section.
    #[error("section [{section}] is missing required key '{key}'")]
    MissingKey { section: String, key: String },

    /// A version string is not valid semver.
    #[error("package '{package}' has invalid version '{value}': {reason}")]
    InvalidVersion {
        package: String,
        value: String,
        reason: String,
    },

    /// A selector pattern could not be compiled.
    #[error("package '{package}' has invalid selector: {reason}")]
    InvalidSelector { package: String, reason: String },

    /// A platform list could not be parsed.
    #[error("package '{package}' has invalid platforms: {reason}")]
    InvalidPlatforms { package: String, reason: String },

    /// A destination directory would escape the output root.
    #[error("package '{package}' destination {} escapes the output root", dir.display())]
    UnsafeDestination { package: String, dir: PathBuf },

    /// Two packages share a name.
    #[error("package '{0}' is declared more than once")]
    DuplicatePackage(String),

    /// A package uses a name reserved as an alias.
    #[error("package name '{0}' is reserved as an alias of the default package")]
    ReservedName(String),

    /// A composite references an undeclared package.
    #[error("composite '{composite}' references unknown package '{member}'")]
    UnknownMember { composite: String, member: String },

    /// A composite has no members.
    #[error("composite '{0}' has no members")]
    EmptyComposite(String),

    /// Composite membership forms a cycle.
    #[error("composite cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// The default package is not declared.
    #[error("default package '{0}' is not declared")]
    MissingDefault(String),
}
