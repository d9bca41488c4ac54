//! Schema migrations, tracked with `PRAGMA user_version`.

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

/// Application tables registered per plugin, in export order.
pub const CORE_TABLES: &[(&str, &[&str])] = &[
    (
        "BaserCore",
        &["sites", "site_configs", "contents", "content_folders", "pages"],
    ),
    ("BcBlog", &["blog_contents", "blog_categories", "blog_posts"]),
];

const MIGRATION_1: &str = r"
CREATE TABLE IF NOT EXISTS app_tables (
    plugin TEXT NOT NULL,
    table_name TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (plugin, table_name)
);

CREATE TABLE IF NOT EXISTS sites (
    id INTEGER PRIMARY KEY,
    name TEXT,
    title TEXT,
    theme TEXT,
    status INTEGER,
    created TEXT,
    modified TEXT
);

CREATE TABLE IF NOT EXISTS site_configs (
    id INTEGER PRIMARY KEY,
    name TEXT,
    value TEXT,
    created TEXT,
    modified TEXT
);

CREATE TABLE IF NOT EXISTS contents (
    id INTEGER PRIMARY KEY,
    site_id INTEGER,
    parent_id INTEGER,
    name TEXT,
    plugin TEXT,
    type TEXT,
    entity_id INTEGER,
    url TEXT,
    title TEXT,
    status INTEGER,
    created TEXT,
    modified TEXT
);

CREATE TABLE IF NOT EXISTS content_folders (
    id INTEGER PRIMARY KEY,
    folder_template TEXT,
    page_template TEXT,
    created TEXT,
    modified TEXT
);

CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY,
    contents TEXT,
    draft TEXT,
    page_template TEXT,
    created TEXT,
    modified TEXT
);
";

const MIGRATION_2: &str = r"
CREATE TABLE IF NOT EXISTS blog_contents (
    id INTEGER PRIMARY KEY,
    description TEXT,
    template TEXT,
    list_count INTEGER,
    created TEXT,
    modified TEXT
);

CREATE TABLE IF NOT EXISTS blog_categories (
    id INTEGER PRIMARY KEY,
    blog_content_id INTEGER,
    name TEXT,
    title TEXT,
    created TEXT,
    modified TEXT
);

CREATE TABLE IF NOT EXISTS blog_posts (
    id INTEGER PRIMARY KEY,
    blog_content_id INTEGER,
    blog_category_id INTEGER,
    no INTEGER,
    name TEXT,
    content TEXT,
    detail TEXT,
    status INTEGER,
    posted TEXT,
    created TEXT,
    modified TEXT
);
";

/// Bring the schema up to [`SCHEMA_VERSION`] and return it.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let mut version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

    if version < 1 {
        apply(conn, 1, MIGRATION_1)?;
        version = 1;
    }
    if version < 2 {
        apply(conn, 2, MIGRATION_2)?;
        version = 2;
    }

    Ok(version)
}

fn apply(conn: &Connection, version: u32, sql: &str) -> Result<()> {
    tracing::debug!(version, "applying migration");
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    for (plugin, tables) in CORE_TABLES {
        for (position, table) in tables.iter().enumerate() {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
                [table],
                |row| row.get(0),
            )?;
            if exists {
                tx.execute(
                    "INSERT OR IGNORE INTO app_tables (plugin, table_name, position) VALUES (?, ?, ?)",
                    rusqlite::params![plugin, table, i64::try_from(position).unwrap_or(i64::MAX)],
                )?;
            }
        }
    }
    tx.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    tx.commit()?;
    Ok(())
}
