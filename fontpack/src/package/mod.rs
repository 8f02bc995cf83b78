//! Package model.
//!
//! This module provides the declarative building blocks the composer works
//! from:
//!
//! - **PackageSpec**: a leaf package (source directory, selector, layout)
//! - **CompositePackage**: a union of other packages
//! - **Selector**: which source files belong to a package
//! - **DestinationRule**: where a selected file lands under the output root
//! - **PlatformSet**: informational list of supported target platforms
//!
//! # Type Hierarchy
//!
//! ```text
//! PackageSpec (leaf)                CompositePackage
//! ├── name, version                 ├── name, version
//! ├── source_dir: PathBuf           ├── members: Vec<String> ──→ leaf or composite
//! ├── selector: Selector            └── metadata
//! ├── destination: DestinationRule
//! └── metadata: PackageMetadata
//! ```

mod composite;
mod core;
mod layout;
mod platform;
mod selector;

pub use composite::CompositePackage;
pub use core::{PackageMetadata, PackageSpec};
pub use layout::{DestinationRule, TRUETYPE_INSTALL_DIR};
pub use platform::{Platform, PlatformSet};
pub use selector::{Selector, TRUETYPE_EXTENSION};

// Re-export semver::Version for convenience
pub use semver::Version;
