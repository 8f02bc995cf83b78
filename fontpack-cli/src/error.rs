//! CLI error type and process exit codes.

use fontpack::composer::{ComposeError, ComposeErrorKind};
use fontpack::logging::LoggingError;
use fontpack::manifest::ManifestError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Building, planning, or describing a package failed.
    Compose(ComposeError),

    /// The manifest file could not be loaded.
    Manifest(ManifestError),

    /// Logging could not be initialized.
    Logging(LoggingError),

    /// Formatting command output failed.
    Output(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Compose(e) => match e.kind() {
                ComposeErrorKind::UnknownPackage => 3,
                ComposeErrorKind::EmptyPackage => 4,
                ComposeErrorKind::DestinationCollision => 5,
                ComposeErrorKind::CompositeConflict => 6,
                ComposeErrorKind::Io => 7,
                ComposeErrorKind::InvalidManifest => 8,
                ComposeErrorKind::Locked => 9,
            },
            CliError::Manifest(_) => 8,
            CliError::Logging(_) | CliError::Output(_) => 1,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Compose(e) => write!(f, "{}", e),
            CliError::Manifest(e) => write!(f, "invalid manifest: {}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Compose(e) => Some(e),
            CliError::Manifest(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Output(_) => None,
        }
    }
}

impl From<ComposeError> for CliError {
    fn from(e: ComposeError) -> Self {
        CliError::Compose(e)
    }
}

impl From<ManifestError> for CliError {
    fn from(e: ManifestError) -> Self {
        CliError::Manifest(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            CliError::Compose(ComposeError::UnknownPackage {
                name: "x".to_string(),
                known: vec![],
            }),
            CliError::Compose(ComposeError::EmptyPackage {
                package: "x".to_string(),
                source_dir: PathBuf::from("fonts"),
                selector: "*.ttf".to_string(),
            }),
            CliError::Compose(ComposeError::DestinationCollision {
                package: "x".to_string(),
                destination: PathBuf::from("share/fonts/truetype/A.ttf"),
                first: PathBuf::from("a/A.ttf"),
                second: PathBuf::from("b/A.ttf"),
            }),
            CliError::Compose(ComposeError::CompositeConflict {
                composite: "default".to_string(),
                destination: PathBuf::from("share/fonts/truetype/A.ttf"),
                first_package: "a".to_string(),
                second_package: "b".to_string(),
            }),
            CliError::Compose(ComposeError::ReadFailed {
                path: PathBuf::from("fonts"),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            }),
            CliError::Compose(ComposeError::InvalidManifest(ManifestError::MissingDefault(
                "default".to_string(),
            ))),
            CliError::Compose(ComposeError::Locked {
                output_root: PathBuf::from("result"),
                lock_path: PathBuf::from("."),
            }),
        ];

        let codes: Vec<u8> = errors.iter().map(CliError::exit_code).collect();
        assert_eq!(codes, vec![3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_manifest_error_maps_to_invalid_manifest_code() {
        let err = CliError::from(ManifestError::UnknownSection("bogus".to_string()));
        assert_eq!(err.exit_code(), 8);
        assert!(err.to_string().contains("bogus"));
    }
}
