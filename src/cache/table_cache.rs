use crate::cache::{file_cache, EmbeddingKey};
use crate::db::Db;
use crate::error::{EmbedcacheError, Result};
use rusqlite::{params, OptionalExtension};
use std::path::Path;

/// Create the embeddings table if it does not already exist
///
/// Idempotent; every operation below runs it before touching the table.
/// The schema carries no uniqueness constraint: the service-level
/// presence check is the only duplicate guard.
pub fn ensure_table(db: &Db) -> Result<()> {
    db.conn().execute(
        "CREATE TABLE IF NOT EXISTS embeddings (
            text TEXT NOT NULL,
            model TEXT NOT NULL,
            embedding BLOB NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Whether a row with an exact (text, model) match exists
pub fn contains(db: &Db, key: &EmbeddingKey) -> Result<bool> {
    ensure_table(db)?;
    let exists: bool = db.conn().query_row(
        "SELECT EXISTS(SELECT 1 FROM embeddings WHERE text = ?1 AND model = ?2)",
        params![key.text(), key.model()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Fetch the stored vector for an exact (text, model) match
///
/// Callers check `contains` first or handle the not-found error.
pub fn get(db: &Db, key: &EmbeddingKey) -> Result<Vec<f64>> {
    ensure_table(db)?;
    let blob: Option<Vec<u8>> = db
        .conn()
        .query_row(
            "SELECT embedding FROM embeddings WHERE text = ?1 AND model = ?2",
            params![key.text(), key.model()],
            |row| row.get(0),
        )
        .optional()?;

    match blob {
        Some(blob) => embedding_from_blob(&blob),
        None => Err(EmbedcacheError::NotFound {
            text: key.text().to_string(),
            model: key.model().to_string(),
        }),
    }
}

/// Insert a new (text, model, embedding) row
///
/// No duplicate check: calling `put` twice with the same key yields two
/// rows.
pub fn put(db: &Db, key: &EmbeddingKey, embedding: &[f64]) -> Result<()> {
    ensure_table(db)?;
    db.conn().execute(
        "INSERT INTO embeddings (text, model, embedding) VALUES (?1, ?2, ?3)",
        params![key.text(), key.model(), embedding_to_blob(embedding)],
    )?;
    Ok(())
}

/// Filter `keys` down to those already present in the table
pub fn keys_in_table(db: &Db, keys: &[EmbeddingKey]) -> Result<Vec<EmbeddingKey>> {
    let mut present = Vec::new();
    for key in keys {
        if contains(db, key)? {
            present.push(key.clone());
        }
    }
    Ok(present)
}

/// Copy every file-cache entry at `path` into the table, one row per
/// entry, without deduplicating against rows already there. Returns the
/// number of rows written.
pub fn migrate_from_file_cache<P: AsRef<Path>>(db: &Db, path: P) -> Result<usize> {
    let cache = file_cache::load(path)?;
    ensure_table(db)?;

    let mut written = 0;
    for (key, embedding) in &cache {
        put(db, key, embedding)?;
        written += 1;
    }
    Ok(written)
}

/// Encode a vector as a BLOB of little-endian f64 values
pub(crate) fn embedding_to_blob(embedding: &[f64]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode a BLOB of little-endian f64 values back into a vector
pub(crate) fn embedding_from_blob(blob: &[u8]) -> Result<Vec<f64>> {
    if blob.len() % 8 != 0 {
        return Err(EmbedcacheError::Deserialization(format!(
            "Embedding BLOB length {} is not a multiple of 8",
            blob.len()
        )));
    }

    let mut floats = Vec::with_capacity(blob.len() / 8);
    for bytes in blob.chunks(8) {
        let arr: [u8; 8] = bytes.try_into().map_err(|_| {
            EmbedcacheError::Deserialization("Invalid embedding BLOB length".to_string())
        })?;
        floats.push(f64::from_le_bytes(arr));
    }
    Ok(floats)
}
