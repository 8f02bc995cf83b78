//! Exclusive output-root locking.
//!
//! Concurrent builds are serialized with an advisory `fd-lock` taken on the
//! output root's parent directory. On Unix the directory handle itself is
//! locked, so a build creates nothing outside its output root. Elsewhere a
//! `.<root name>.fontpack.lock` file in the parent is locked and removed
//! again on release.
//!
//! The lock is non-blocking: a second build fails with
//! [`ComposeError::Locked`] instead of waiting. Builds into sibling roots
//! share a parent and therefore a lock.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tracing::debug;

use super::error::{ComposeError, ComposeResult};

/// Path whose lock guards `output_root`.
#[cfg(unix)]
pub fn lock_path_for(output_root: &Path) -> PathBuf {
    parent_dir(output_root).to_path_buf()
}

/// Path whose lock guards `output_root`.
#[cfg(not(unix))]
pub fn lock_path_for(output_root: &Path) -> PathBuf {
    let name = output_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    parent_dir(output_root).join(format!(".{}.fontpack.lock", name))
}

/// Parent directory of `path`, treating a bare file name as `.`.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn open_lock_target(lock_path: &Path) -> io::Result<File> {
    File::open(lock_path)
}

#[cfg(not(unix))]
fn open_lock_target(lock_path: &Path) -> io::Result<File> {
    std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)
}

#[cfg(unix)]
fn release_lock_target(_lock_path: &Path) {}

#[cfg(not(unix))]
fn release_lock_target(lock_path: &Path) {
    if let Err(e) = std::fs::remove_file(lock_path) {
        debug!(lock = %lock_path.display(), error = %e, "Lock file not removed");
    }
}

/// An open, not yet acquired output-root lock.
pub struct OutputLock {
    output_root: PathBuf,
    lock_path: PathBuf,
    lock: RwLock<File>,
}

impl OutputLock {
    /// Open the lock target for `output_root`. Its parent must exist.
    pub fn open(output_root: &Path) -> ComposeResult<Self> {
        let lock_path = lock_path_for(output_root);
        let file = open_lock_target(&lock_path).map_err(ComposeError::write(&lock_path))?;

        Ok(Self {
            output_root: output_root.to_path_buf(),
            lock_path,
            lock: RwLock::new(file),
        })
    }

    /// Run `f` while holding the exclusive lock.
    ///
    /// The lock is released when `f` returns, whether it succeeded or not.
    pub fn with_exclusive<T>(
        &mut self,
        f: impl FnOnce() -> ComposeResult<T>,
    ) -> ComposeResult<T> {
        let result = {
            let _guard = match self.lock.try_write() {
                Ok(guard) => guard,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Err(ComposeError::Locked {
                        output_root: self.output_root.clone(),
                        lock_path: self.lock_path.clone(),
                    });
                }
                Err(e) => {
                    return Err(ComposeError::WriteFailed {
                        path: self.lock_path.clone(),
                        source: e,
                    });
                }
            };

            debug!(lock = %self.lock_path.display(), "Acquired output root lock");
            f()
        };

        release_lock_target(&self.lock_path);
        result
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}
