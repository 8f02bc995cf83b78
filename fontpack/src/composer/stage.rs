//! Staging and committing package trees.
//!
//! A build materializes its plan in a staging directory next to the output
//! root and only then moves the result into place:
//!
//! 1. **Stage**: copy every planned file into the staging tree and set its mode
//! 2. **Commit**: rename the staging tree onto the output root if the root does
//!    not exist yet; otherwise rename each staged file into the existing root
//!
//! Staging and output root share a parent directory, so every rename stays on
//! one filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::checksum::calculate_file_checksum;
use super::error::{ComposeError, ComposeResult};
use super::plan::PlannedFile;

/// A file placed under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    /// Leaf package the file belongs to.
    pub package: String,

    /// Path relative to the output root.
    pub path: PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// Lowercase hex SHA-256 of the contents.
    pub checksum: String,
}

/// Copy `files` into `staging_root`, applying `file_mode` to each copy.
pub fn stage_files(
    files: &[PlannedFile],
    staging_root: &Path,
    file_mode: u32,
) -> ComposeResult<Vec<InstalledFile>> {
    files
        .iter()
        .map(|file| {
            stage_file(file, staging_root, file_mode).map_err(|e| e.in_package(&file.package))
        })
        .collect()
}

fn stage_file(
    file: &PlannedFile,
    staging_root: &Path,
    file_mode: u32,
) -> ComposeResult<InstalledFile> {
    let target = staging_root.join(&file.destination);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(ComposeError::create_dir(parent))?;
    }

    let size = fs::copy(&file.source, &target).map_err(|e| copy_error(file, &target, e))?;
    set_mode(&target, file_mode)?;
    let checksum = calculate_file_checksum(&target)?;

    debug!(
        package = %file.package,
        source = %file.source.display(),
        destination = %file.destination.display(),
        size,
        "Staged file"
    );

    Ok(InstalledFile {
        package: file.package.clone(),
        path: file.destination.clone(),
        size,
        checksum,
    })
}

/// Resolve the directory a build actually writes to.
///
/// An existing root (or a symlink to a directory) is canonicalized, so
/// staging happens beside the real directory. A missing root is returned
/// as given. Roots without a final name component (`/`, `..`) are rejected:
/// they have no parent to stage in.
pub fn resolve_output_root(output_root: &Path) -> ComposeResult<PathBuf> {
    let invalid = |reason: &str| ComposeError::InvalidOutputRoot {
        path: output_root.to_path_buf(),
        reason: reason.to_string(),
    };

    let resolved = match fs::symlink_metadata(output_root) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => output_root.to_path_buf(),
        Err(e) => {
            return Err(ComposeError::ReadFailed {
                path: output_root.to_path_buf(),
                source: e,
            })
        }
        Ok(_) => {
            let meta = fs::metadata(output_root).map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    invalid("dangling symlink")
                } else {
                    ComposeError::ReadFailed {
                        path: output_root.to_path_buf(),
                        source: e,
                    }
                }
            })?;
            if !meta.is_dir() {
                return Err(invalid("exists and is not a directory"));
            }
            fs::canonicalize(output_root).map_err(ComposeError::read(output_root))?
        }
    };

    if resolved.file_name().is_none() {
        return Err(invalid("has no parent directory to stage in"));
    }
    Ok(resolved)
}

/// Move a staged tree into `output_root`.
///
/// When `output_root` does not exist the whole staging directory is renamed
/// onto it in one step and given `dir_mode`. Otherwise every staged file
/// replaces the file at the same relative path in the existing root; files
/// already in the root that the build does not produce are left alone.
pub fn commit(
    staging_root: &Path,
    output_root: &Path,
    files: &[InstalledFile],
    dir_mode: u32,
) -> ComposeResult<()> {
    match fs::symlink_metadata(output_root) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            set_mode(staging_root, dir_mode)?;
            fs::rename(staging_root, output_root).map_err(ComposeError::write(output_root))?;
            debug!(output_root = %output_root.display(), "Committed staging tree by rename");
            Ok(())
        }
        Err(e) => Err(ComposeError::ReadFailed {
            path: output_root.to_path_buf(),
            source: e,
        }),
        // Follow symlinks; a dangling link is reported, never replaced.
        Ok(_) => match fs::metadata(output_root) {
            Ok(meta) if meta.is_dir() => merge_into(staging_root, output_root, files),
            Ok(_) => Err(ComposeError::WriteFailed {
                path: output_root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
            }),
            Err(e) => Err(ComposeError::WriteFailed {
                path: output_root.to_path_buf(),
                source: e,
            }),
        },
    }
}

fn merge_into(staging_root: &Path, output_root: &Path, files: &[InstalledFile]) -> ComposeResult<()> {
    // Refuse before moving anything if a destination is occupied by a
    // directory.
    for file in files {
        let dest = output_root.join(&file.path);
        if dest.is_dir() {
            return Err(ComposeError::WriteFailed {
                path: dest,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "is a directory"),
            });
        }
    }

    for file in files {
        let staged = staging_root.join(&file.path);
        let dest = output_root.join(&file.path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(ComposeError::create_dir(parent))?;
        }
        fs::rename(&staged, &dest).map_err(ComposeError::write(&dest))?;
    }

    debug!(
        output_root = %output_root.display(),
        files = files.len(),
        "Merged staging tree into existing output root"
    );
    Ok(())
}

fn copy_error(file: &PlannedFile, target: &Path, e: io::Error) -> ComposeError {
    // fs::copy does not say which side failed.
    if file.source.is_file() {
        ComposeError::WriteFailed {
            path: target.to_path_buf(),
            source: e,
        }
    } else {
        ComposeError::ReadFailed {
            path: file.source.clone(),
            source: e,
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> ComposeResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(ComposeError::write(path))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> ComposeResult<()> {
    let mut perms = fs::metadata(path)
        .map_err(ComposeError::read(path))?
        .permissions();
    perms.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, perms).map_err(ComposeError::write(path))
}
