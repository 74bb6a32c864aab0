//! Database query implementations

use crate::error::Result;
use crate::types::{Server, ServerId};
use rusqlite::{params, Connection, OptionalExtension};

// ===== Server Queries =====

/// Insert or replace a server at the given position
pub fn upsert_server(conn: &Connection, server: &Server, sort_order: usize) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO servers (id, name, url, sort_order, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            url = excluded.url,
            sort_order = excluded.sort_order
        "#,
        params![
            server.id.as_str(),
            server.name,
            server.url,
            sort_order as i64,
            server.created_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// Delete a server
pub fn delete_server(conn: &Connection, server_id: &ServerId) -> Result<()> {
    conn.execute("DELETE FROM servers WHERE id = ?", params![server_id.as_str()])?;
    Ok(())
}

/// List persisted servers in display order
pub fn list_servers(conn: &Connection) -> Result<Vec<Server>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, url, created_at FROM servers ORDER BY sort_order ASC, created_at ASC",
    )?;

    let servers = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let created_at: String = row.get(3)?;
            let mut server = Server::with_id(id, row.get::<_, String>(1)?, row.get::<_, String>(2)?);
            server.created_at = parse_datetime(&created_at);
            Ok(server)
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(servers)
}

/// Rewrite the sort order of every listed server
pub fn set_server_order(conn: &Connection, order: &[ServerId]) -> Result<()> {
    let mut stmt = conn.prepare("UPDATE servers SET sort_order = ? WHERE id = ?")?;
    for (index, id) in order.iter().enumerate() {
        stmt.execute(params![index as i64, id.as_str()])?;
    }
    Ok(())
}

// ===== Settings Queries =====

/// Get a setting value
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let result = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(result)
}

/// Set a setting value
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
        params![key, value],
    )?;

    Ok(())
}

/// Remove a setting
pub fn delete_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key = ?", params![key])?;
    Ok(())
}

/// Get all settings
pub fn get_all_settings(conn: &Connection) -> Result<std::collections::HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;

    let settings = stmt
        .query_map([], |row| {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((key, value))
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(settings)
}

// ===== Helper Functions =====

fn parse_datetime(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_server_crud() {
        let conn = setup_db();

        let first = Server::with_id("s1", "Community", "https://community.example.com");
        let second = Server::with_id("s2", "Work", "https://work.example.com");
        upsert_server(&conn, &first, 0).unwrap();
        upsert_server(&conn, &second, 1).unwrap();

        let servers = list_servers(&conn).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].id, ServerId::new("s1"));
        assert_eq!(servers[1].name, "Work");
        assert!(!servers[0].is_logged_in);

        // Rename through upsert
        let renamed = Server {
            name: "Community Edition".to_string(),
            ..first.clone()
        };
        upsert_server(&conn, &renamed, 0).unwrap();
        assert_eq!(list_servers(&conn).unwrap()[0].name, "Community Edition");

        delete_server(&conn, &ServerId::new("s1")).unwrap();
        let servers = list_servers(&conn).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].id, ServerId::new("s2"));
    }

    #[test]
    fn test_server_order() {
        let conn = setup_db();

        upsert_server(&conn, &Server::with_id("a", "A", "https://a.example.com"), 0).unwrap();
        upsert_server(&conn, &Server::with_id("b", "B", "https://b.example.com"), 1).unwrap();

        set_server_order(&conn, &[ServerId::new("b"), ServerId::new("a")]).unwrap();

        let ids: Vec<_> = list_servers(&conn).unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![ServerId::new("b"), ServerId::new("a")]);
    }

    #[test]
    fn test_settings() {
        let conn = setup_db();

        set_setting(&conn, "current_server", "s1").unwrap();
        assert_eq!(get_setting(&conn, "current_server").unwrap(), Some("s1".to_string()));

        // Overwrite
        set_setting(&conn, "current_server", "s2").unwrap();
        assert_eq!(get_setting(&conn, "current_server").unwrap(), Some("s2".to_string()));
        assert_eq!(get_all_settings(&conn).unwrap().len(), 1);

        delete_setting(&conn, "current_server").unwrap();
        assert!(get_setting(&conn, "current_server").unwrap().is_none());
    }
}
