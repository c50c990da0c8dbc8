pub mod similarity;

pub use similarity::{cosine_similarity, find_similar, SimilarText};
