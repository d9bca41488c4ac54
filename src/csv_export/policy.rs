//! Column blanking for tables that carry environment-specific secrets.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::config::ExportConfig;
use crate::csv_export::codec::{read_records, write_records};
use crate::error::{BcError, Result};
use crate::storage::FileSystem;

/// Which values must not leave the installation in an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPolicy {
    pub table: String,
    pub key_column: String,
    pub value_column: String,
    pub sensitive_keys: BTreeSet<String>,
}

impl ColumnPolicy {
    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            table: config.sensitive_table.clone(),
            key_column: config.key_column.clone(),
            value_column: config.value_column.clone(),
            sensitive_keys: config.sensitive_keys.iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn applies_to(&self, table: &str) -> bool {
        self.table == table
    }

    #[must_use]
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.sensitive_keys.contains(key)
    }

    /// Blank the value cell of every sensitive row in CSV `text`.
    ///
    /// Returns the rewritten text and how many cells were blanked. Header,
    /// row order and every other cell are kept as they are.
    pub fn blank_sensitive(&self, text: &str) -> Result<(String, usize)> {
        let mut records = read_records(text)?;
        let Some(header) = records.first() else {
            return Ok((text.to_string(), 0));
        };

        let key_idx = column_position(header, &self.key_column, &self.table)?;
        let value_idx = column_position(header, &self.value_column, &self.table)?;

        let mut blanked = 0;
        for record in records.iter_mut().skip(1) {
            let sensitive = record
                .get(key_idx)
                .is_some_and(|key| self.sensitive_keys.contains(key));
            if !sensitive {
                continue;
            }
            if let Some(value) = record.get_mut(value_idx) {
                if !value.is_empty() {
                    value.clear();
                    blanked += 1;
                }
            }
        }

        Ok((write_records(&records)?, blanked))
    }

    /// Post-processing pass over an already written CSV file.
    pub fn blank_sensitive_in_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<usize> {
        let text = fs.read_file(path)?;
        let (rewritten, blanked) = self.blank_sensitive(&text)?;
        if blanked > 0 {
            fs.write_file(path, &rewritten)?;
        }
        debug!(path = %path.display(), blanked, "applied column policy");
        Ok(blanked)
    }
}

fn column_position(header: &[String], column: &str, table: &str) -> Result<usize> {
    header
        .iter()
        .position(|c| c == column)
        .ok_or_else(|| BcError::Csv(format!("{table}: column {column:?} missing from header")))
}
