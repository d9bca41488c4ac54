//! bctheme - theme packaging and application for multi-site CMS installs.
//!
//! Copies, deletes and stages themes for download, exports the current
//! database as default-data CSV patterns, loads patterns back, and applies
//! themes to sites.

pub mod app;
pub mod cli;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod market;
pub mod storage;
pub mod test_utils;
pub mod theme;
pub mod utils;

pub use error::{BcError, Result};
