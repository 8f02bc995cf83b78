//! File selection predicates.

use std::fmt;
use std::path::Path;

use glob::Pattern;

/// Extension of TrueType font files.
pub const TRUETYPE_EXTENSION: &str = "ttf";

/// Chooses which source files belong to a package.
///
/// Matching is case-sensitive: `Font.TTF` is not selected by the `ttf`
/// extension selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// File extension equals the given string (without the dot).
    Extension(String),

    /// File name matches a glob pattern (e.g., `*-Fast.ttf`).
    Pattern(Pattern),
}

impl Selector {
    /// Selector for `.ttf` files.
    pub fn truetype() -> Self {
        Self::Extension(TRUETYPE_EXTENSION.to_string())
    }

    /// Selector for the given extension. A leading dot is ignored.
    pub fn extension(ext: &str) -> Self {
        Self::Extension(ext.trim_start_matches('.').to_string())
    }

    /// Selector for a file-name glob.
    pub fn pattern(pattern: &str) -> Result<Self, glob::PatternError> {
        Pattern::new(pattern).map(Self::Pattern)
    }

    /// Check whether a file path is selected.
    ///
    /// Only the final path component is inspected, so the directory a file
    /// lives in never affects selection.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use fontpack::package::Selector;
    ///
    /// let selector = Selector::truetype();
    /// assert!(selector.matches(Path::new("fonts/sub/Go-Mono-Fast.ttf")));
    /// assert!(!selector.matches(Path::new("fonts/notes.txt")));
    /// assert!(!selector.matches(Path::new("fonts/LOUD.TTF")));
    /// ```
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            Self::Extension(ext) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == ext),
            Self::Pattern(pattern) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.matches(n)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension(ext) => write!(f, "*.{}", ext),
            Self::Pattern(pattern) => write!(f, "{}", pattern.as_str()),
        }
    }
}
