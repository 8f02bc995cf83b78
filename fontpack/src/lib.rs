//! fontpack - Font package composition
//!
//! This library turns declarative package descriptions into installable
//! font trees. Leaf packages scan a source directory for font files;
//! composite packages are unions of other packages. Every package installs
//! into the same layout:
//!
//! ```text
//! <output_root>/share/fonts/truetype/<basename>.ttf   (mode 0444)
//! ```

pub mod composer;
pub mod logging;
pub mod manifest;
pub mod package;
