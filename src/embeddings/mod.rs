pub mod openai;
pub mod provider;
pub mod service;

pub use openai::OpenAIClient;
pub use provider::EmbeddingProvider;
pub use service::EmbeddingService;
