use crate::cache::{file_cache, table_cache, EmbeddingKey, FileCacheMap};
use crate::db::Db;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Cache-or-compute orchestration over both store variants
///
/// Holds the provider and the file-cache location. The table-backed
/// calls take the database explicitly: the two stores are independent
/// caches over the same key space and are never reconciled here.
pub struct EmbeddingService {
    provider: Box<dyn EmbeddingProvider>,
    file_cache_path: PathBuf,
}

impl EmbeddingService {
    pub fn new<P: AsRef<Path>>(provider: Box<dyn EmbeddingProvider>, file_cache_path: P) -> Self {
        Self {
            provider,
            file_cache_path: file_cache_path.as_ref().to_path_buf(),
        }
    }

    /// Embed `texts` through the file-backed cache, output order matching
    /// input order
    ///
    /// One load at batch start, one save at batch end. The save runs on
    /// every exit path, so entries resolved before a mid-batch provider
    /// failure are still persisted; the failure itself propagates.
    pub fn embed_with_file_cache(&self, texts: &[String], model: &str) -> Result<Vec<Vec<f64>>> {
        let mut cache = file_cache::load(&self.file_cache_path)?;

        let batch = self.fill_from_file_cache(&mut cache, texts, model);
        let saved = file_cache::save(&cache, &self.file_cache_path);

        match (batch, saved) {
            (Ok(embeddings), Ok(())) => Ok(embeddings),
            (Ok(_), Err(save_err)) => Err(save_err),
            (Err(batch_err), Ok(())) => Err(batch_err),
            (Err(batch_err), Err(save_err)) => {
                log::warn!(
                    "Failed to persist file cache after batch error: {}",
                    save_err
                );
                Err(batch_err)
            }
        }
    }

    fn fill_from_file_cache(
        &self,
        cache: &mut FileCacheMap,
        texts: &[String],
        model: &str,
    ) -> Result<Vec<Vec<f64>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let key = EmbeddingKey::new(text.clone(), model.to_string());
            let embedding = match cache.get(&key) {
                Some(cached) => cached.clone(),
                None => {
                    log::debug!("File cache miss for {:?}", text);
                    let computed = self.provider.embed(text, model)?;
                    cache.insert(key, computed.clone());
                    computed
                }
            };
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }

    /// Embed `texts` through the table-backed cache, output order matching
    /// input order
    ///
    /// Presence check per text, one insert per miss. Every resolved entry
    /// is durable on its own, so a provider failure mid-batch loses
    /// nothing already written.
    pub fn embed_with_table_cache(
        &self,
        db: &Db,
        texts: &[String],
        model: &str,
    ) -> Result<Vec<Vec<f64>>> {
        texts
            .iter()
            .map(|text| self.table_cached_embedding(db, text, model))
            .collect()
    }

    /// Single-text table path: cache hit, or compute and insert
    pub fn table_cached_embedding(&self, db: &Db, text: &str, model: &str) -> Result<Vec<f64>> {
        let key = EmbeddingKey::new(text.to_string(), model.to_string());
        if table_cache::contains(db, &key)? {
            return table_cache::get(db, &key);
        }

        log::debug!("Table cache miss for {:?}", text);
        let embedding = self.provider.embed(text, model)?;
        table_cache::put(db, &key, &embedding)?;
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbedcacheError;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Deterministic fake provider: counts calls, optionally fails on one
    /// text, and derives the vector from the text so order is checkable.
    struct ScriptedProvider {
        calls: Rc<Cell<usize>>,
        fail_on: Option<String>,
    }

    impl EmbeddingProvider for ScriptedProvider {
        fn embed(&self, text: &str, _model: &str) -> Result<Vec<f64>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_on.as_deref() == Some(text) {
                return Err(EmbedcacheError::Provider("scripted failure".to_string()));
            }
            Ok(test_embedding(text))
        }
    }

    fn test_embedding(text: &str) -> Vec<f64> {
        vec![
            text.len() as f64,
            text.bytes().map(f64::from).sum::<f64>(),
            1.0,
        ]
    }

    fn service_with_counter(
        temp_dir: &TempDir,
        fail_on: Option<&str>,
    ) -> (EmbeddingService, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let provider = ScriptedProvider {
            calls: calls.clone(),
            fail_on: fail_on.map(String::from),
        };
        let service = EmbeddingService::new(
            Box::new(provider),
            temp_dir.path().join("cache.json"),
        );
        (service, calls)
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_file_cache_hit_skips_provider() {
        let temp_dir = TempDir::new().unwrap();
        let (service, calls) = service_with_counter(&temp_dir, None);
        let batch = texts(&["first", "second"]);

        let initial = service.embed_with_file_cache(&batch, "test-model").unwrap();
        assert_eq!(calls.get(), 2);

        // Second run must resolve entirely from the cache file
        let repeated = service.embed_with_file_cache(&batch, "test-model").unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(repeated, initial);
    }

    #[test]
    fn test_file_cache_distinguishes_models() {
        let temp_dir = TempDir::new().unwrap();
        let (service, calls) = service_with_counter(&temp_dir, None);
        let batch = texts(&["same text"]);

        service.embed_with_file_cache(&batch, "model-a").unwrap();
        service.embed_with_file_cache(&batch, "model-b").unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_table_cache_hit_skips_provider() {
        let temp_dir = TempDir::new().unwrap();
        let (service, calls) = service_with_counter(&temp_dir, None);
        let db = Db::open_in_memory().unwrap();
        let batch = texts(&["first", "second"]);

        let initial = service
            .embed_with_table_cache(&db, &batch, "test-model")
            .unwrap();
        assert_eq!(calls.get(), 2);

        let repeated = service
            .embed_with_table_cache(&db, &batch, "test-model")
            .unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(repeated, initial);
    }

    #[test]
    fn test_table_cache_batch_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _calls) = service_with_counter(&temp_dir, None);
        let db = Db::open_in_memory().unwrap();
        let batch = texts(&["a", "b", "c"]);

        let embeddings = service
            .embed_with_table_cache(&db, &batch, "test-model")
            .unwrap();

        assert_eq!(
            embeddings,
            vec![test_embedding("a"), test_embedding("b"), test_embedding("c")]
        );
    }

    #[test]
    fn test_file_cache_batch_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _calls) = service_with_counter(&temp_dir, None);
        let batch = texts(&["a", "b", "c"]);

        let embeddings = service.embed_with_file_cache(&batch, "test-model").unwrap();

        assert_eq!(
            embeddings,
            vec![test_embedding("a"), test_embedding("b"), test_embedding("c")]
        );
    }

    #[test]
    fn test_file_cache_persists_entries_before_mid_batch_failure() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _calls) = service_with_counter(&temp_dir, Some("boom"));
        let batch = texts(&["resolved", "boom", "never reached"]);

        let result = service.embed_with_file_cache(&batch, "test-model");
        assert!(matches!(result, Err(EmbedcacheError::Provider(_))));

        // The entry resolved before the failure was saved anyway
        let cache = file_cache::load(temp_dir.path().join("cache.json")).unwrap();
        let resolved = EmbeddingKey::new("resolved".to_string(), "test-model".to_string());
        assert_eq!(cache.get(&resolved), Some(&test_embedding("resolved")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_table_cache_keeps_rows_before_mid_batch_failure() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _calls) = service_with_counter(&temp_dir, Some("boom"));
        let db = Db::open_in_memory().unwrap();
        let batch = texts(&["resolved", "boom"]);

        let result = service.embed_with_table_cache(&db, &batch, "test-model");
        assert!(matches!(result, Err(EmbedcacheError::Provider(_))));

        let resolved = EmbeddingKey::new("resolved".to_string(), "test-model".to_string());
        let missing = EmbeddingKey::new("boom".to_string(), "test-model".to_string());
        assert!(table_cache::contains(&db, &resolved).unwrap());
        assert!(!table_cache::contains(&db, &missing).unwrap());
    }

    #[test]
    fn test_repeated_text_within_batch_calls_provider_once() {
        let temp_dir = TempDir::new().unwrap();
        let (service, calls) = service_with_counter(&temp_dir, None);
        let db = Db::open_in_memory().unwrap();
        let batch = texts(&["same", "same", "same"]);

        let embeddings = service
            .embed_with_table_cache(&db, &batch, "test-model")
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(embeddings.len(), 3);
        assert!(embeddings.iter().all(|e| e == &test_embedding("same")));
    }
}
