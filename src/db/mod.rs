use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

/// Database connection wrapper
///
/// Owns a single synchronous connection. Every store operation is a
/// blocking round trip on this connection; there is no pooling and no
/// concurrent-writer support.
pub struct Db {
    conn: Connection,
}

impl Db {
    /// Open (creating if needed) the database at `path` with tuned pragmas
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests, throwaway runs)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

// WAL mode for crash safety on file databases, NORMAL sync for speed,
// temp_store = MEMORY for faster temp operations
fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL; \
         PRAGMA synchronous = NORMAL; \
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}
