//! SQLite-backed ledger store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::{Ledger, LedgerStore, Topic, TopicError};

/// Ledger kept in a `published_topics` table, ordered by insertion.
pub struct SqliteLedgerStore {
    conn: Mutex<Connection>,
}

impl SqliteLedgerStore {
    /// Open (or create) the database file, its parent directory and its table.
    pub fn new(path: &Path) -> Result<Self, TopicError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    TopicError::Persistence(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| TopicError::Persistence(format!("{}: {}", path.display(), e)))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, TopicError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TopicError::Configuration(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TopicError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS published_topics (
                position INTEGER PRIMARY KEY AUTOINCREMENT,
                topic TEXT NOT NULL UNIQUE,
                published_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| TopicError::Configuration(e.to_string()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, TopicError> {
        self.conn
            .lock()
            .map_err(|_| TopicError::Persistence("ledger connection poisoned".to_string()))
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load(&self) -> Result<Ledger, TopicError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT topic FROM published_topics ORDER BY position")
            .map_err(|e| TopicError::Persistence(e.to_string()))?;
        let published = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| TopicError::Persistence(e.to_string()))?
            .into_iter()
            .map(Topic::from)
            .collect();
        Ok(Ledger::new(published))
    }

    fn append(&self, topic: &Topic) -> Result<(), TopicError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO published_topics (topic, published_at) VALUES (?1, ?2)",
            params![topic.as_str(), chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| TopicError::Persistence(e.to_string()))?;
        Ok(())
    }

    fn reset(&self) -> Result<(), TopicError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM published_topics", [])
            .map_err(|e| TopicError::Persistence(e.to_string()))?;
        Ok(())
    }
}
