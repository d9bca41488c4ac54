//! Load a theme's default-data pattern into the database.
//!
//! A pattern is laid out the way an export is: `<pattern>/<Plugin>/<table>.csv`.
//! Every table that has a CSV file is replaced in one transaction; tables
//! without one are left alone.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::csv_export::{ColumnPolicy, read_table_csv};
use crate::error::{BcError, Result};
use crate::storage::{FileSystem, RowStore, TableData, TableRegistry};
use crate::theme::scanner::ThemeScanner;
use crate::theme::{ThemeLayout, validate_name};

/// What a load replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub theme: String,
    pub pattern: String,
    /// `(plugin, table, rows)` per replaced table, in registry order.
    pub tables: Vec<(String, String, usize)>,
    pub rows: usize,
    /// Sensitive values kept from the current database because the pattern
    /// had them blank.
    pub kept_values: usize,
}

pub struct DefaultDataLoader<'a> {
    fs: &'a dyn FileSystem,
    registry: &'a dyn TableRegistry,
    rows: &'a dyn RowStore,
    layout: &'a ThemeLayout,
    policy: ColumnPolicy,
}

impl<'a> DefaultDataLoader<'a> {
    #[must_use]
    pub const fn new(
        fs: &'a dyn FileSystem,
        registry: &'a dyn TableRegistry,
        rows: &'a dyn RowStore,
        layout: &'a ThemeLayout,
        policy: ColumnPolicy,
    ) -> Self {
        Self {
            fs,
            registry,
            rows,
            layout,
            policy,
        }
    }

    /// Load pattern `key`, written `"<theme>.<pattern>"`.
    pub fn load(&self, key: &str) -> Result<LoadReport> {
        let (theme, pattern) = split_pattern_key(key)?;
        ThemeScanner::new(self.fs, self.layout).require(theme)?;

        let pattern_dir = self.layout.pattern_path(theme, pattern);
        if !self.fs.exists(&pattern_dir) {
            return Err(BcError::NotFound(format!("default data pattern {key}")));
        }

        let mut report = LoadReport {
            theme: theme.to_string(),
            pattern: pattern.to_string(),
            ..LoadReport::default()
        };
        let mut tables = Vec::new();

        for plugin in self.registry.plugins()? {
            let plugin_dir = pattern_dir.join(&plugin);
            for table in self.registry.app_table_list(&plugin)? {
                let Some(mut data) = read_table_csv(self.fs, &table, &plugin_dir)? else {
                    debug!(plugin = %plugin, table = %table, "no csv in pattern, keeping table");
                    continue;
                };
                if self.policy.applies_to(&table) {
                    report.kept_values += self.keep_sensitive_values(&mut data)?;
                }
                report.tables.push((plugin.clone(), table.clone(), data.rows.len()));
                tables.push(data);
            }
        }

        report.rows = self.rows.replace_tables(&tables)?;
        info!(
            pattern = key,
            tables = report.tables.len(),
            rows = report.rows,
            "loaded default data"
        );
        Ok(report)
    }

    /// Fill blank sensitive values in `incoming` from the current table.
    fn keep_sensitive_values(&self, incoming: &mut TableData) -> Result<usize> {
        let (Some(key_idx), Some(value_idx)) = (
            incoming.column_index(&self.policy.key_column),
            incoming.column_index(&self.policy.value_column),
        ) else {
            return Ok(0);
        };

        let current = self.rows.read_table(&incoming.name)?;
        let (Some(cur_key), Some(cur_value)) = (
            current.column_index(&self.policy.key_column),
            current.column_index(&self.policy.value_column),
        ) else {
            return Ok(0);
        };

        let existing: HashMap<&str, &str> = current
            .rows
            .iter()
            .filter_map(|row| {
                let key = row.get(cur_key)?.as_deref()?;
                let value = row.get(cur_value)?.as_deref()?;
                self.policy.is_sensitive(key).then_some((key, value))
            })
            .collect();

        let mut kept = 0;
        for row in &mut incoming.rows {
            let Some(key) = row.get(key_idx).cloned().flatten() else {
                continue;
            };
            let blank = row.get(value_idx).is_some_and(Option::is_none);
            if let (true, Some(value)) = (blank, existing.get(key.as_str())) {
                row[value_idx] = Some((*value).to_string());
                kept += 1;
            }
        }
        Ok(kept)
    }
}

/// Split `"<theme>.<pattern>"` at the last dot.
pub fn split_pattern_key(key: &str) -> Result<(&str, &str)> {
    let (theme, pattern) = key.rsplit_once('.').ok_or_else(|| {
        BcError::ValidationFailed(format!("pattern key must be <theme>.<pattern>: {key}"))
    })?;
    validate_name("theme", theme)?;
    validate_name("pattern", pattern)?;
    Ok((theme, pattern))
}
