//! Embedding service contract
//!
//! Request: `{"values": [{"recordId": "1", "data": {"text": "..."}}]}`.
//! Response: `{"values": [{"recordId": "1", "data": {"vector": [..]}}]}`, or
//! `{"error": "..."}` when the request cannot be processed. Items missing
//! `recordId`, `data` or `data.text` are skipped.

pub mod encoder;
pub mod service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

pub use encoder::HashingEncoder;
pub use service::EmbeddingService;

/// Turns texts into fixed-size vectors
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encoder name for logging
    fn name(&self) -> &str;

    /// Length of every produced vector
    fn dimension(&self) -> usize;

    /// Encode a batch of texts, one vector per text in input order
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Vector payload of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    pub vector: Vec<f32>,
}

/// One embedded record in the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedRecord {
    pub record_id: String,
    pub data: VectorData,
}

/// Successful embedding response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub values: Vec<EmbeddedRecord>,
}

/// Error payload returned instead of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingErrorPayload {
    pub error: String,
}
