mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::models::*;

/// SQLite-backed store for installations and room documents.
///
/// Each room is a single row whose `users` and `options` columns hold the JSON
/// document `{users: {mention: status}, options: {showExpired}}`.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "standup")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("standup.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Installation operations
    // ============================================================

    pub fn save_installation(&self, installation: &Installation) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO installations
                (oauth_id, oauth_secret, group_id, room_id, capabilities_url, token_url, api_url, installed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(oauth_id) DO UPDATE SET
                oauth_secret = excluded.oauth_secret,
                group_id = excluded.group_id,
                room_id = excluded.room_id,
                capabilities_url = excluded.capabilities_url,
                token_url = excluded.token_url,
                api_url = excluded.api_url,
                installed_at = excluded.installed_at",
            (
                &installation.oauth_id,
                &installation.oauth_secret,
                installation.group_id as i64,
                installation.room_id as i64,
                &installation.capabilities_url,
                &installation.token_url,
                &installation.api_url,
                installation.installed_at.to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    pub fn get_installation(&self, oauth_id: &str) -> Result<Option<Installation>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let installation = conn
            .query_row(
                "SELECT oauth_id, oauth_secret, group_id, room_id, capabilities_url, token_url, api_url, installed_at
                 FROM installations WHERE oauth_id = ?",
                [oauth_id],
                installation_from_row,
            )
            .optional()?;
        Ok(installation)
    }

    pub fn get_all_installations(&self) -> Result<Vec<Installation>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT oauth_id, oauth_secret, group_id, room_id, capabilities_url, token_url, api_url, installed_at
             FROM installations ORDER BY installed_at",
        )?;

        let installations = stmt
            .query_map([], installation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(installations)
    }

    pub fn delete_installation(&self, oauth_id: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM installations WHERE oauth_id = ?", [oauth_id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Room operations
    // ============================================================

    pub fn get_room_data(&self, key: &RoomKey) -> Result<Option<RoomData>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_room(&conn, key)
    }

    pub fn save_room_data(&self, key: &RoomKey, data: &RoomData) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        store_room(&conn, key, data)
    }

    /// Merge one status into the room, replacing any previous status of the
    /// same member. Statuses of other members are left untouched.
    pub fn upsert_status(&self, key: &RoomKey, entry: StatusEntry) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut data = load_room(&conn, key)?.unwrap_or_default();
        data.statuses.insert(entry.user.mention_name.clone(), entry);
        store_room(&conn, key, &data)
    }

    pub fn set_room_options(&self, key: &RoomKey, options: RoomOptions) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut data = load_room(&conn, key)?.unwrap_or_default();
        data.options = options;
        store_room(&conn, key, &data)
    }
}

fn load_room(conn: &Connection, key: &RoomKey) -> Result<Option<RoomData>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT users, options FROM rooms
             WHERE client_id = ? AND group_id = ? AND capabilities_url = ?",
            (&key.client_id, key.group_id as i64, &key.capabilities_url),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((users, options)) = row else {
        return Ok(None);
    };

    let statuses = serde_json::from_str(&users)
        .with_context(|| format!("Corrupt status document for client {}", key.client_id))?;
    let options = serde_json::from_str(&options)
        .with_context(|| format!("Corrupt room options for client {}", key.client_id))?;

    Ok(Some(RoomData { statuses, options }))
}

fn store_room(conn: &Connection, key: &RoomKey, data: &RoomData) -> Result<()> {
    conn.execute(
        "INSERT INTO rooms (client_id, group_id, capabilities_url, users, options, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(client_id, group_id, capabilities_url) DO UPDATE SET
            users = excluded.users,
            options = excluded.options,
            updated_at = excluded.updated_at",
        (
            &key.client_id,
            key.group_id as i64,
            &key.capabilities_url,
            serde_json::to_string(&data.statuses)?,
            serde_json::to_string(&data.options)?,
            Utc::now().to_rfc3339(),
        ),
    )?;
    Ok(())
}

fn installation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Installation> {
    Ok(Installation {
        oauth_id: row.get(0)?,
        oauth_secret: row.get(1)?,
        group_id: row.get::<_, i64>(2)? as u64,
        room_id: row.get::<_, i64>(3)? as u64,
        capabilities_url: row.get(4)?,
        token_url: row.get(5)?,
        api_url: row.get(6)?,
        installed_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
