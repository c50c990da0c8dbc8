use thiserror::Error;

/// Main error type for embedcache
#[derive(Error, Debug)]
pub enum EmbedcacheError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or unreadable stored data (file cache, embedding BLOBs)
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding provider errors
    #[error("Embedding provider error: {0}")]
    Provider(String),

    /// No stored embedding for a (text, model) pair
    #[error("Embedding for {text} with model {model} not found in table")]
    NotFound { text: String, model: String },
}

/// Convenient Result type using EmbedcacheError
pub type Result<T> = std::result::Result<T, EmbedcacheError>;
