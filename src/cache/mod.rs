pub mod file_cache;
pub mod key;
pub mod table_cache;

pub use file_cache::FileCacheMap;
pub use key::EmbeddingKey;
