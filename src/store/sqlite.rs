use super::{DocumentId, DocumentStore, StoreError, StoredDocument};
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL
);
";

/// Keeps `IN (...)` lists under SQLite's bound-parameter limit.
const MAX_IDS_PER_QUERY: usize = 500;

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open or create the store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "opened document store");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert(&self, text: &str, embedding: &[u8]) -> Result<DocumentId, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (text, embedding) VALUES (?1, ?2)",
            params![text, embedding],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<StoredDocument>, StoreError> {
        let conn = self.conn.lock();
        let mut out = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = format!(
                "SELECT id, text, embedding FROM documents WHERE id IN ({}) ORDER BY id",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok(StoredDocument {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    embedding: row.get(2)?,
                })
            })?;
            for row in rows {
                out.push(row?);
            }
        }
        if ids.len() > MAX_IDS_PER_QUERY {
            out.sort_by_key(|doc| doc.id);
            out.dedup_by_key(|doc| doc.id);
        }
        Ok(out)
    }

    fn existing_ids(&self, ids: &[DocumentId]) -> Result<Vec<DocumentId>, StoreError> {
        let conn = self.conn.lock();
        let mut out: Vec<DocumentId> = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = format!(
                "SELECT id FROM documents WHERE id IN ({}) ORDER BY id",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| row.get(0))?;
            for row in rows {
                out.push(row?);
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    fn scan_embeddings(&self) -> Result<Vec<(DocumentId, Vec<u8>)>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, embedding FROM documents ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out: Vec<(DocumentId, Vec<u8>)> = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
