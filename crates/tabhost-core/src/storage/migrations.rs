//! Database migrations

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Schema changes in the order they must be applied
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_servers", MIGRATION_001_SERVERS),
    ("002_settings", MIGRATION_002_SETTINGS),
];

/// Bring the schema up to date; already applied migrations are skipped
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;

    let mut applied = 0;
    for &(name, sql) in MIGRATIONS {
        if migration_applied(conn, name)? {
            continue;
        }
        debug!("Applying migration: {}", name);
        conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", sql))?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
        applied += 1;
    }

    if applied > 0 {
        info!("Applied {} migration(s)", applied);
    }
    Ok(())
}

fn migration_applied(conn: &Connection, name: &str) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM migrations WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

const MIGRATION_001_SERVERS: &str = r#"
-- User-added servers, in the order shown in the server dropdown
CREATE TABLE IF NOT EXISTS servers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_servers_order ON servers(sort_order);
"#;

const MIGRATION_002_SETTINGS: &str = r#"
-- Runtime settings table
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#;
