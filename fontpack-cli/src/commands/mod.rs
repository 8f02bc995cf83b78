//! CLI command implementations.

pub mod build;
pub mod common;
pub mod describe;
pub mod list;
pub mod plan;
