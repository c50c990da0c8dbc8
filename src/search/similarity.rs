use crate::cache::table_cache;
use crate::db::Db;
use crate::embeddings::EmbeddingService;
use crate::error::Result;

/// One similarity-search hit: a stored text and its cosine score against
/// the query embedding
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarText {
    pub text: String,
    pub score: f64,
}

/// Find the `top_k` stored texts most similar to `text`
///
/// The query embedding is resolved through the table-cache path
/// (cache-or-compute), so the query text itself ends up stored.
/// Candidates are the distinct (text, embedding) rows whose text differs
/// from the query; each is scored with cosine similarity and the best
/// `top_k` are returned descending. Ties keep the store's native order.
pub fn find_similar(
    db: &Db,
    service: &EmbeddingService,
    text: &str,
    model: &str,
    top_k: usize,
) -> Result<Vec<SimilarText>> {
    let query_vec = service.table_cached_embedding(db, text, model)?;

    // Duplicate rows collapse here; only the text has to differ
    let mut stmt = db
        .conn()
        .prepare("SELECT DISTINCT text, embedding FROM embeddings WHERE text != ?1")?;
    let mut rows = stmt.query(rusqlite::params![text])?;

    let mut scored: Vec<SimilarText> = Vec::new();
    while let Some(row) = rows.next()? {
        let candidate: String = row.get(0)?;
        let blob: Vec<u8> = row.get(1)?;
        let embedding = table_cache::embedding_from_blob(&blob)?;
        scored.push(SimilarText {
            score: cosine_similarity(&query_vec, &embedding),
            text: candidate,
        });
    }

    log::debug!("Scored {} candidates for {:?}", scored.len(), text);

    // Stable sort: equal scores keep the store's row order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    Ok(scored)
}

/// Compute cosine similarity between two vectors
///
/// Computed as dot / sqrt(|a|^2 * |b|^2), which yields exactly 1.0 for
/// two identical non-zero vectors. Returns 0.0 if either vector has zero
/// magnitude.
///
/// # Panics
///
/// Panics if vectors have different lengths (should not happen in normal operation)
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have same length for cosine similarity"
    );

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_b: f64 = b.iter().map(|x| x * x).sum();

    // Handle zero magnitude vectors
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b).sqrt()
}
