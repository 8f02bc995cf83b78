//! Output layout conventions.
//!
//! Every package, composites included, installs into the same relative
//! layout so that package trees can be unioned without path rewriting:
//!
//! ```text
//! <output_root>/share/fonts/truetype/<basename>.ttf
//! ```

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Relative directory that TrueType fonts are installed into.
pub const TRUETYPE_INSTALL_DIR: &str = "share/fonts/truetype";

/// Maps a selected source file to a path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationRule {
    /// Place every file directly in `dir`, discarding its source
    /// subdirectory structure.
    Flatten {
        /// Relative directory under the output root.
        dir: PathBuf,
    },
}

impl DestinationRule {
    /// Flatten into `share/fonts/truetype`.
    pub fn truetype() -> Self {
        Self::flatten(TRUETYPE_INSTALL_DIR)
    }

    /// Flatten into the given relative directory.
    pub fn flatten(dir: impl Into<PathBuf>) -> Self {
        Self::Flatten { dir: dir.into() }
    }

    /// Check that the rule cannot escape the output root.
    ///
    /// The directory must be relative and must not contain `..` components.
    pub fn is_contained(&self) -> bool {
        match self {
            Self::Flatten { dir } => dir
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir)),
        }
    }

    /// Compute the destination of `source` relative to the output root.
    ///
    /// Returns `None` when `source` has no file name.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use fontpack::package::DestinationRule;
    ///
    /// let rule = DestinationRule::truetype();
    /// assert_eq!(
    ///     rule.destination(Path::new("fonts/sub/dir/Go-Mono-Fast.ttf")),
    ///     Some(PathBuf::from("share/fonts/truetype/Go-Mono-Fast.ttf"))
    /// );
    /// ```
    pub fn destination(&self, source: &Path) -> Option<PathBuf> {
        match self {
            Self::Flatten { dir } => source.file_name().map(|name| dir.join(name)),
        }
    }
}

impl fmt::Display for DestinationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flatten { dir } => write!(f, "flatten into {}", dir.display()),
        }
    }
}
