//! Error types for the Package Composer.

use std::io;
use std::path::PathBuf;

use crate::manifest::ManifestError;

/// Result type for composer operations.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Coarse error classification, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeErrorKind {
    UnknownPackage,
    EmptyPackage,
    DestinationCollision,
    CompositeConflict,
    InvalidManifest,
    Locked,
    Io,
}

/// Errors that can occur while resolving or building a package.
///
/// Every error is terminal for the current build.
#[derive(Debug)]
pub enum ComposeError {
    /// Requested package is not declared in the manifest.
    UnknownPackage { name: String, known: Vec<String> },

    /// The selector matched no files in the package's source directory.
    EmptyPackage {
        package: String,
        source_dir: PathBuf,
        selector: String,
    },

    /// Two files of one package map to the same destination.
    DestinationCollision {
        package: String,
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// Two member packages of a composite claim the same destination.
    CompositeConflict {
        composite: String,
        destination: PathBuf,
        first_package: String,
        second_package: String,
    },

    /// The manifest is structurally invalid.
    InvalidManifest(ManifestError),

    /// Another build holds the output root's lock.
    Locked {
        output_root: PathBuf,
        lock_path: PathBuf,
    },

    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or directory.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// The output root cannot be built into.
    InvalidOutputRoot { path: PathBuf, reason: String },

    /// A failure while scanning or copying one leaf package's files.
    InPackage {
        package: String,
        source: Box<ComposeError>,
    },
}

impl ComposeError {
    /// Classify this error.
    pub fn kind(&self) -> ComposeErrorKind {
        match self {
            Self::UnknownPackage { .. } => ComposeErrorKind::UnknownPackage,
            Self::EmptyPackage { .. } => ComposeErrorKind::EmptyPackage,
            Self::DestinationCollision { .. } => ComposeErrorKind::DestinationCollision,
            Self::CompositeConflict { .. } => ComposeErrorKind::CompositeConflict,
            Self::InvalidManifest(_) => ComposeErrorKind::InvalidManifest,
            Self::Locked { .. } => ComposeErrorKind::Locked,
            Self::ReadFailed { .. }
            | Self::WriteFailed { .. }
            | Self::CreateDirFailed { .. }
            | Self::InvalidOutputRoot { .. } => ComposeErrorKind::Io,
            Self::InPackage { source, .. } => source.kind(),
        }
    }

    /// Attach the leaf package a failure happened in.
    pub(crate) fn in_package(self, package: &str) -> Self {
        match self {
            Self::InPackage { .. } => self,
            other => Self::InPackage {
                package: package.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::ReadFailed { path, source }
    }

    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::WriteFailed { path, source }
    }

    pub(crate) fn create_dir(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::CreateDirFailed { path, source }
    }
}

impl std::fmt::Display for ComposeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPackage { name, known } => {
                write!(
                    f,
                    "unknown package '{}' (declared: {})",
                    name,
                    known.join(", ")
                )
            }
            Self::EmptyPackage {
                package,
                source_dir,
                selector,
            } => {
                write!(
                    f,
                    "package '{}' is empty: no files matching {} under {}",
                    package,
                    selector,
                    source_dir.display()
                )
            }
            Self::DestinationCollision {
                package,
                destination,
                first,
                second,
            } => {
                write!(
                    f,
                    "package '{}' installs two files to {}: {} and {}",
                    package,
                    destination.display(),
                    first.display(),
                    second.display()
                )
            }
            Self::CompositeConflict {
                composite,
                destination,
                first_package,
                second_package,
            } => {
                write!(
                    f,
                    "composite '{}' conflict: packages '{}' and '{}' both install {}",
                    composite,
                    first_package,
                    second_package,
                    destination.display()
                )
            }
            Self::InvalidManifest(e) => write!(f, "invalid manifest: {}", e),
            Self::Locked {
                output_root,
                lock_path,
            } => {
                write!(
                    f,
                    "output root {} is locked by another build ({})",
                    output_root.display(),
                    lock_path.display()
                )
            }
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::InvalidOutputRoot { path, reason } => {
                write!(f, "invalid output root {}: {}", path.display(), reason)
            }
            Self::InPackage { package, source } => {
                write!(f, "package '{}': {}", package, source)
            }
        }
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidManifest(e) => Some(e),
            Self::ReadFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::InPackage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<ManifestError> for ComposeError {
    fn from(e: ManifestError) -> Self {
        Self::InvalidManifest(e)
    }
}
