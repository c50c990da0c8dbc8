pub mod config;
pub mod error;
pub mod db;
pub mod cache;
pub mod embeddings;
pub mod search;

pub use config::Config;
pub use error::{EmbedcacheError, Result};
