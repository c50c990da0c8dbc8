use serde::{Deserialize, Serialize};

/// Identity of one cached embedding: the exact source text and the model
/// that produced the vector.
///
/// Equality and hashing are structural over both fields, case-sensitive,
/// with no normalization. Both store variants look up by this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddingKey {
    text: String,
    model: String,
}

impl EmbeddingKey {
    pub fn new(text: String, model: String) -> Self {
        Self { text, model }
    }

    /// The content that was (or will be) embedded
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Identifier of the embedding model/version
    pub fn model(&self) -> &str {
        &self.model
    }
}
