//! SQLite schema creation and version checks.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported schema version: expected {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// Safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a card cache database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per catalog printing
CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,
    oracle_id TEXT,
    name TEXT NOT NULL,
    layout TEXT NOT NULL DEFAULT '',
    type_line TEXT NOT NULL DEFAULT '',
    mana_cost TEXT,
    mana_value REAL NOT NULL DEFAULT 0,
    colors TEXT NOT NULL DEFAULT '[]',
    color_identity TEXT NOT NULL DEFAULT '[]',
    oracle_text TEXT,
    set_code TEXT NOT NULL DEFAULT '',
    set_name TEXT NOT NULL DEFAULT '',
    collector_number TEXT NOT NULL DEFAULT '',
    rarity TEXT NOT NULL DEFAULT '',
    prices TEXT NOT NULL DEFAULT '{}',
    legalities TEXT NOT NULL DEFAULT '{}',
    has_back_face BOOLEAN NOT NULL DEFAULT 0,
    image_uris TEXT,
    back_image_uris TEXT,
    cached_image_small TEXT,
    cached_image_normal TEXT,
    cached_image_large TEXT,
    cached_back_image_small TEXT,
    cached_back_image_normal TEXT,
    cached_back_image_large TEXT,
    commander_eligible BOOLEAN NOT NULL DEFAULT 0,
    cached_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_cards_oracle ON cards(oracle_id);
CREATE INDEX IF NOT EXISTS idx_cards_cached_at ON cards(cached_at);

-- Alternate names (individual faces of split and double-faced cards)
CREATE TABLE IF NOT EXISTS card_aliases (
    card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
    alias TEXT NOT NULL,
    PRIMARY KEY (card_id, alias)
);
CREATE INDEX IF NOT EXISTS idx_card_aliases_alias ON card_aliases(alias COLLATE NOCASE);
"#;
