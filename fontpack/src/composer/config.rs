//! Configuration for the Package Composer.

/// Permission bits of installed files (read-only for all).
pub const DEFAULT_FILE_MODE: u32 = 0o444;

/// Permission bits of a freshly created output root.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Configuration for the Package Composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Mode applied to every installed file.
    ///
    /// Only honored on Unix; elsewhere files are marked read-only.
    pub file_mode: u32,

    /// Mode applied to the output root when the build creates it.
    pub dir_mode: u32,

    /// Whether to hold an exclusive lock on the output root while writing.
    pub lock_output: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            file_mode: DEFAULT_FILE_MODE,
            dir_mode: DEFAULT_DIR_MODE,
            lock_output: true,
        }
    }
}

impl ComposerConfig {
    /// Set the installed file mode.
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Set the output root mode.
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Enable or disable output-root locking.
    pub fn with_lock_output(mut self, lock: bool) -> Self {
        self.lock_output = lock;
        self
    }
}
