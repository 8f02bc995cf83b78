//! Source directory scanning.
//!
//! Walks a package's source tree and returns the files its selector picks.
//! Symbolic links are never followed out of the source tree:
//!
//! - a symlinked file is kept only if its canonical target is a regular file
//!   inside the canonical source directory
//! - symlinked directories are never descended

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{ComposeError, ComposeResult};
use crate::package::Selector;

/// Return every selected file under `source_dir`, sorted by path.
///
/// Returned paths are rooted at the canonical form of `source_dir`.
pub fn scan_source(source_dir: &Path, selector: &Selector) -> ComposeResult<Vec<PathBuf>> {
    let root = fs::canonicalize(source_dir).map_err(ComposeError::read(source_dir))?;
    if !root.is_dir() {
        return Err(ComposeError::ReadFailed {
            path: source_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let mut found = Vec::new();
    walk_dir(&root, &root, selector, &mut found)?;
    found.sort();

    debug!(
        source = %source_dir.display(),
        selector = %selector,
        count = found.len(),
        "Scanned source directory"
    );
    Ok(found)
}

fn walk_dir(
    root: &Path,
    dir: &Path,
    selector: &Selector,
    found: &mut Vec<PathBuf>,
) -> ComposeResult<()> {
    for entry in fs::read_dir(dir).map_err(ComposeError::read(dir))? {
        let entry = entry.map_err(ComposeError::read(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(ComposeError::read(&path))?;

        if file_type.is_dir() {
            walk_dir(root, &path, selector, found)?;
        } else if file_type.is_symlink() {
            if selector.matches(&path) && symlink_stays_inside(root, &path) {
                found.push(path);
            }
        } else if file_type.is_file() && selector.matches(&path) {
            found.push(path);
        }
    }

    Ok(())
}

/// Check that a symlink resolves to a regular file inside `root`.
fn symlink_stays_inside(root: &Path, link: &Path) -> bool {
    match fs::canonicalize(link) {
        Ok(target) if target.starts_with(root) && target.is_file() => true,
        Ok(target) => {
            warn!(
                link = %link.display(),
                target = %target.display(),
                "Skipping symlink that does not resolve to a file inside the source directory"
            );
            false
        }
        Err(e) => {
            warn!(link = %link.display(), error = %e, "Skipping dangling symlink");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_recursive_selection() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("sub/dir")).unwrap();
        fs::write(root.join("A.ttf"), "a").unwrap();
        fs::write(root.join("sub/dir/B.ttf"), "b").unwrap();
        fs::write(root.join("sub/notes.txt"), "n").unwrap();
        fs::write(root.join("sub/LOUD.TTF"), "l").unwrap();

        let found = scan_source(root, &Selector::truetype()).unwrap();
        assert_eq!(names(&found), vec!["A.ttf", "B.ttf"]);
    }

    #[test]
    fn test_empty_dir() {
        let temp = TempDir::new().unwrap();
        let found = scan_source(temp.path(), &Selector::truetype()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_dir() {
        let err = scan_source(Path::new("/nonexistent/fonts"), &Selector::truetype()).unwrap_err();
        assert!(matches!(err, ComposeError::ReadFailed { .. }));
    }

    #[test]
    fn test_source_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("A.ttf");
        fs::write(&file, "a").unwrap();

        let err = scan_source(&file, &Selector::truetype()).unwrap_err();
        assert!(matches!(err, ComposeError::ReadFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_do_not_escape() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        let root = temp.path().join("fonts");
        fs::create_dir_all(outside.join("more")).unwrap();
        fs::create_dir_all(&root).unwrap();

        fs::write(outside.join("Secret.ttf"), "s").unwrap();
        fs::write(outside.join("more/Deep.ttf"), "d").unwrap();
        fs::write(root.join("Real.ttf"), "r").unwrap();

        symlink(outside.join("Secret.ttf"), root.join("Escape.ttf")).unwrap();
        symlink(outside.join("more"), root.join("linked-dir")).unwrap();
        symlink(root.join("Real.ttf"), root.join("Alias.ttf")).unwrap();
        symlink(root.join("missing.ttf"), root.join("Dangling.ttf")).unwrap();

        let found = scan_source(&root, &Selector::truetype()).unwrap();
        assert_eq!(names(&found), vec!["Alias.ttf", "Real.ttf"]);
    }
}
