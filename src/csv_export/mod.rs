//! Default-data CSV export.
//!
//! One CSV file per application table. The sensitive table gets a second
//! pass that blanks environment-specific values after the file is written.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::storage::{FileSystem, RowStore, TableData};

pub mod codec;
pub mod policy;

pub use codec::{csv_to_table, table_to_csv};
pub use policy::ColumnPolicy;

/// Read `table` from `rows` and return it as CSV text.
pub fn export_table_to_csv(rows: &dyn RowStore, table: &str) -> Result<String> {
    let data = rows.read_table(table)?;
    table_to_csv(&data)
}

/// Write `table` to `<dir>/<table>.csv`, then run the column policy over the
/// written file when it covers this table.
pub fn write_table_csv(
    fs: &dyn FileSystem,
    rows: &dyn RowStore,
    policy: &ColumnPolicy,
    table: &str,
    dir: &Path,
) -> Result<PathBuf> {
    let path = dir.join(format!("{table}.csv"));
    let text = export_table_to_csv(rows, table)?;
    fs.write_file(&path, &text)?;
    if policy.applies_to(table) {
        policy.blank_sensitive_in_file(fs, &path)?;
    }
    debug!(table, path = %path.display(), "wrote table csv");
    Ok(path)
}

/// Read `<dir>/<table>.csv` back into table rows, if the file exists.
pub fn read_table_csv(fs: &dyn FileSystem, table: &str, dir: &Path) -> Result<Option<TableData>> {
    let path = dir.join(format!("{table}.csv"));
    if !fs.exists(&path) {
        return Ok(None);
    }
    let text = fs.read_file(&path)?;
    csv_to_table(table, &text).map(Some)
}
