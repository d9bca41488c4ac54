//! SQLite database layer

use std::path::Path;

use chrono::Utc;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::error::{BcError, Result};
use crate::storage::migrations;
use crate::storage::{RowStore, Site, SiteStore, TableData, TableRegistry};

/// SQLite database holding sites and the exported application tables.
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

/// Fields of a site to insert.
#[derive(Debug, Clone)]
pub struct NewSite<'a> {
    pub id: Option<i64>,
    pub name: &'a str,
    pub title: &'a str,
    pub theme: &'a str,
    pub status: bool,
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    /// Register `table` as owned by `plugin`, appended after its existing tables.
    pub fn register_app_table(&self, plugin: &str, table: &str) -> Result<()> {
        validate_identifier(table)?;
        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM app_tables WHERE plugin = ?",
            [plugin],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO app_tables (plugin, table_name, position) VALUES (?, ?, ?)",
            params![plugin, table, position],
        )?;
        Ok(())
    }

    pub fn insert_site(&self, site: &NewSite<'_>) -> Result<Site> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sites (id, name, title, theme, status, created, modified)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                site.id,
                site.name,
                site.title,
                site.theme,
                i64::from(site.status),
                now,
                now
            ],
        )?;
        self.get_site(self.conn.last_insert_rowid())
    }

    /// Insert or update a `site_configs` entry.
    pub fn set_site_config(&self, name: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE site_configs SET value = ?, modified = ? WHERE name = ?",
            params![value, now, name],
        )?;
        if updated == 0 {
            self.conn.execute(
                "INSERT INTO site_configs (name, value, created, modified) VALUES (?, ?, ?, ?)",
                params![name, value, now, now],
            )?;
        }
        Ok(())
    }

    pub fn site_config(&self, name: &str) -> Result<Option<String>> {
        let value: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT value FROM site_configs WHERE name = ? ORDER BY id LIMIT 1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    pub fn count_rows(&self, table: &str) -> Result<usize> {
        validate_identifier(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{table}\""),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn site_from_row(row: &Row<'_>) -> rusqlite::Result<Site> {
        Ok(Site {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            theme: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            status: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
            created: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            modified: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        })
    }

    fn fetch_site(conn: &Connection, id: i64) -> Result<Site> {
        conn.query_row(
            "SELECT id, name, title, theme, status, created, modified FROM sites WHERE id = ?",
            [id],
            Self::site_from_row,
        )
        .optional()?
        .ok_or_else(|| BcError::NotFound(format!("site {id}")))
    }
}

impl TableRegistry for Database {
    fn plugins(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT plugin FROM app_tables GROUP BY plugin ORDER BY MIN(rowid)",
        )?;
        let plugins = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(plugins)
    }

    fn app_table_list(&self, plugin: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM app_tables WHERE plugin = ? ORDER BY position, table_name",
        )?;
        let tables = stmt
            .query_map([plugin], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tables)
    }
}

impl RowStore for Database {
    fn read_table(&self, table: &str) -> Result<TableData> {
        validate_identifier(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM \"{table}\" ORDER BY rowid"))
            .map_err(|err| match err {
                rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("no such table") => {
                    BcError::NotFound(format!("table {table}"))
                }
                other => other.into(),
            })?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| (*c).to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(value_to_text))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(TableData {
            name: table.to_string(),
            columns,
            rows,
        })
    }

    fn replace_tables(&self, tables: &[TableData]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;

        for table in tables {
            validate_identifier(&table.name)?;
            for column in &table.columns {
                validate_identifier(column)?;
            }

            tx.execute(&format!("DELETE FROM \"{}\"", table.name), [])?;
            if table.rows.is_empty() {
                continue;
            }

            let column_list = table
                .columns
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = vec!["?"; table.columns.len()].join(", ");
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO \"{}\" ({column_list}) VALUES ({placeholders})",
                table.name
            ))?;

            for (index, row) in table.rows.iter().enumerate() {
                if row.len() != table.columns.len() {
                    return Err(BcError::ValidationFailed(format!(
                        "{} row {}: expected {} values, found {}",
                        table.name,
                        index + 1,
                        table.columns.len(),
                        row.len()
                    )));
                }
                stmt.execute(params_from_iter(row.iter()))?;
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }
}

impl SiteStore for Database {
    fn get_site(&self, id: i64) -> Result<Site> {
        Self::fetch_site(&self.conn, id)
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, title, theme, status, created, modified FROM sites ORDER BY id",
        )?;
        let sites = stmt
            .query_map([], Self::site_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sites)
    }

    fn save_site(&self, site: &Site) -> Result<Site> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE sites SET name = ?, title = ?, theme = ?, status = ?, modified = ? WHERE id = ?",
            params![
                site.name,
                site.title,
                site.theme,
                i64::from(site.status),
                Utc::now().to_rfc3339(),
                site.id
            ],
        )?;
        if updated != 1 {
            return Err(BcError::NotFound(format!("site {}", site.id)));
        }
        let saved = Self::fetch_site(&tx, site.id)?;
        tx.commit()?;
        Ok(saved)
    }
}

fn value_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(hex::encode(b)),
    }
}

/// Table and column names are interpolated into SQL, so only plain
/// identifiers are accepted.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BcError::ValidationFailed(format!("invalid identifier: {name:?}")))
    }
}
