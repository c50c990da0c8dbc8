use crate::cache::EmbeddingKey;
use crate::error::{EmbedcacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Full keyed mapping held by the file-backed cache.
///
/// Lives entirely in memory between a `load` and a `save`; the file is
/// overwritten wholesale on every save, with no append semantics.
pub type FileCacheMap = HashMap<EmbeddingKey, Vec<f64>>;

/// On-disk representation: a flat entry list, since a map keyed by a
/// struct has no JSON object form
#[derive(Serialize, Deserialize)]
struct CacheEntry {
    text: String,
    model: String,
    embedding: Vec<f64>,
}

/// Load the full mapping from `path`
///
/// A missing file is an empty cache. A file that exists but fails to
/// parse surfaces a deserialization error; the cache file stays blocked
/// until it is removed by hand.
pub fn load<P: AsRef<Path>>(path: P) -> Result<FileCacheMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(FileCacheMap::new());
    }

    let bytes = std::fs::read(path)?;
    let entries: Vec<CacheEntry> = serde_json::from_slice(&bytes)
        .map_err(|e| EmbedcacheError::Deserialization(e.to_string()))?;

    Ok(entries
        .into_iter()
        .map(|e| (EmbeddingKey::new(e.text, e.model), e.embedding))
        .collect())
}

/// Serialize the full mapping and overwrite the file at `path`
pub fn save<P: AsRef<Path>>(cache: &FileCacheMap, path: P) -> Result<()> {
    let entries: Vec<CacheEntry> = cache
        .iter()
        .map(|(key, embedding)| CacheEntry {
            text: key.text().to_string(),
            model: key.model().to_string(),
            embedding: embedding.clone(),
        })
        .collect();

    let bytes = serde_json::to_vec(&entries)
        .map_err(|e| EmbedcacheError::Deserialization(e.to_string()))?;
    std::fs::write(path, bytes)?;
    Ok(())
}
