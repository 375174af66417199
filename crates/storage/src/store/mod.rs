#![forbid(unsafe_code)]

mod consistency;
mod error;
mod nodes;
mod requests;
mod types;
mod workspaces;

pub use consistency::dimensions_hash;
pub use error::StoreError;
pub use requests::*;
pub use types::*;

use cr_core::ids::WorkspaceName;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, params};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const DB_FILE: &str = "content_repository.db";
const SCHEMA_VERSION: i64 = 1;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        preflight_gate(&conn)?;
        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    let required: BTreeSet<&str> = ["store_state", "workspaces", "nodes"].into_iter().collect();

    if tables
        .iter()
        .any(|table| !required.contains(table.as_str()))
    {
        return Err(StoreError::Schema("unsupported tables detected"));
    }

    for table in required {
        if !tables.contains(table) {
            return Err(StoreError::Schema("required table is missing"));
        }
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::Schema("schema version mismatch")),
        None => Err(StoreError::Schema("schema state row is missing")),
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workspaces (
          name TEXT PRIMARY KEY,
          base_workspace TEXT,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(base_workspace) REFERENCES workspaces(name) ON DELETE RESTRICT,
          CHECK(base_workspace IS NULL OR base_workspace <> name)
        );

        CREATE TABLE IF NOT EXISTS nodes (
          storage_id TEXT PRIMARY KEY,
          identifier TEXT NOT NULL,
          workspace TEXT NOT NULL,
          path TEXT NOT NULL,
          node_type TEXT NOT NULL,
          dimensions_hash TEXT NOT NULL,
          dimension_values TEXT NOT NULL,
          properties TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          FOREIGN KEY(workspace) REFERENCES workspaces(name) ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_nodes_workspace_path_dimensions
          ON nodes(workspace, path, dimensions_hash);

        CREATE INDEX IF NOT EXISTS idx_nodes_path_dimensions
          ON nodes(path, dimensions_hash);
        "#,
    )?;

    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}

fn workspace_exists_tx(tx: &Transaction<'_>, name: &str) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM workspaces WHERE name=?1",
            params![name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn canonicalize_workspace(value: &str) -> Result<WorkspaceName, StoreError> {
    WorkspaceName::try_new(value).map_err(|_| StoreError::InvalidInput("invalid workspace name"))
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

// Opaque storage key. Only ever used to target a single row; the domain
// identifier lives in the `identifier` column.
fn new_storage_id() -> String {
    use sha2::{Digest, Sha256};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(now_ms().to_be_bytes());
    hasher.update(std::process::id().to_be_bytes());
    hasher.update(counter.to_be_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(32);
    for byte in digest.iter().take(16) {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
