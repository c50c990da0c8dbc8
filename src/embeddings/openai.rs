use crate::embeddings::EmbeddingProvider;
use crate::error::{EmbedcacheError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request structure for OpenAI embeddings API
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response structure from OpenAI embeddings API
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Individual embedding data in API response
#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

/// OpenAI embeddings client
///
/// One blocking request per text. Failures are not retried: network,
/// auth, and rate-limit errors surface immediately as provider errors.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
}

impl OpenAIClient {
    /// Create a new OpenAI embeddings client
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in normal operation)
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, api_key }
    }
}

impl EmbeddingProvider for OpenAIClient {
    fn embed(&self, text: &str, model: &str) -> Result<Vec<f64>> {
        let start = std::time::Instant::now();
        let request = EmbeddingRequest { model, input: text };

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| EmbedcacheError::Provider(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(EmbedcacheError::Provider(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .map_err(|e| EmbedcacheError::Provider(format!("Failed to parse response: {}", e)))?;

        let mut data = result.data;
        if data.is_empty() {
            return Err(EmbedcacheError::Provider(
                "Empty response from OpenAI API".to_string(),
            ));
        }

        log::debug!("Embedding API call took {:?}", start.elapsed());
        Ok(data.remove(0).embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = EmbeddingRequest {
            model: "text-embedding-ada-002",
            input: "some text",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "text-embedding-ada-002");
        assert_eq!(value["input"], "some text");
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{"data": [{"embedding": [0.1, -0.2, 0.3]}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].embedding, vec![0.1, -0.2, 0.3]);
    }

    // Note: Integration tests for actual API calls would require a real API key
    // and should be run separately with proper test fixtures
}
