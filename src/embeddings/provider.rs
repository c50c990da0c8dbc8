use crate::error::Result;

/// Capability seam for the external embedding API
///
/// One call embeds one text with one model. Calls are blocking and are
/// not retried here: any failure surfaces to the caller as a provider
/// error and aborts the batch in progress.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str, model: &str) -> Result<Vec<f64>>;
}
