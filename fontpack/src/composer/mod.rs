//! Package Composer.
//!
//! Resolves a requested package name into a concrete filesystem tree under
//! an output root.
//!
//! # Components
//!
//! - `plan`: read-only resolution of a package into the files it installs
//! - `walk`: recursive, symlink-safe source scanning
//! - `stage`: copy into a staging tree, then commit into the output root
//! - `lock`: exclusive advisory lock per output root
//! - `builder`: the [`PackageComposer`] tying the steps together
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use fontpack::composer::PackageComposer;
//! use fontpack::manifest::Manifest;
//!
//! let composer = PackageComposer::new(Manifest::fast_fonts("fonts", "original-fonts"))?;
//! let report = composer.build("default", Path::new("result"))?;
//! println!("installed {} fonts", report.files.len());
//! # Ok::<(), fontpack::composer::ComposeError>(())
//! ```

mod builder;
mod checksum;
mod config;
mod error;
mod lock;
mod plan;
mod stage;
mod walk;

pub use builder::{BuildProgressCallback, BuildReport, BuildStage, PackageComposer, PackageInfo};
pub use checksum::calculate_file_checksum;
pub use config::{ComposerConfig, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
pub use error::{ComposeError, ComposeErrorKind, ComposeResult};
pub use lock::{lock_path_for, OutputLock};
pub use plan::{resolve, BuildPlan, PlannedFile};
pub use stage::InstalledFile;
pub use walk::scan_source;
