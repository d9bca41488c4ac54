//! Storage layer for bctheme
//!
//! Two backends sit behind narrow traits: the filesystem holding theme
//! trees and staging directories, and the SQLite database holding sites and
//! the application tables exported as default data.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod fs;
pub mod lock;
pub mod migrations;
pub mod sqlite;

pub use fs::{FileSystem, FsEntry, LocalFs};
pub use lock::GlobalLock;
pub use sqlite::Database;

/// A managed website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub theme: String,
    pub status: bool,
    pub created: String,
    pub modified: String,
}

/// Rows of one table, all values in their text form.
///
/// `None` stands for SQL NULL; CSV files carry it as an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableData {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableData {
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Enumerates the application tables each plugin owns.
pub trait TableRegistry {
    /// Plugins with at least one registered table, in registration order.
    fn plugins(&self) -> Result<Vec<String>>;

    /// Tables owned by `plugin`; empty for unknown plugins.
    fn app_table_list(&self, plugin: &str) -> Result<Vec<String>>;
}

/// Bulk row access used by default-data export and import.
pub trait RowStore {
    fn read_table(&self, table: &str) -> Result<TableData>;

    /// Replace the contents of every given table in one transaction.
    /// Returns the number of rows inserted.
    fn replace_tables(&self, tables: &[TableData]) -> Result<usize>;
}

pub trait SiteStore {
    fn get_site(&self, id: i64) -> Result<Site>;

    fn list_sites(&self) -> Result<Vec<Site>>;

    /// Persist `site` and return the stored row. Either the whole update
    /// lands or nothing changes.
    fn save_site(&self, site: &Site) -> Result<Site>;
}
