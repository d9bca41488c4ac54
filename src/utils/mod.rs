//! Small helpers shared by the CLI and config loading.

pub mod fs;

pub use fs::*;
