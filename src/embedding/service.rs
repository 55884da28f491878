//! Embedding request handler
//!
//! The service owns its encoder for the whole process lifetime. It is built once
//! at startup with [`EmbeddingService::init`], which fails immediately if the
//! encoder cannot produce vectors, and is then passed to whoever handles requests.

use serde_json::{json, Value as JsonValue};
use tracing::{debug, error, info};

use super::{EmbeddedRecord, EmbeddingErrorPayload, EmbeddingResponse, TextEncoder, VectorData};
use crate::utils::error::{ReportError, Result};

const MISSING_VALUES: &str = "Input data does not contain 'values' key.";

/// A well-formed request item
#[derive(Debug, Clone, PartialEq)]
struct TextRecord {
    record_id: String,
    text: String,
}

/// Embedding service bound to one initialised encoder
pub struct EmbeddingService<E: TextEncoder> {
    encoder: E,
}

impl<E: TextEncoder> EmbeddingService<E> {
    /// Initialise the service, verifying the encoder with a probe text
    pub async fn init(encoder: E) -> Result<Self> {
        let probe = encoder.encode(&["initialisation probe".to_string()]).await?;
        match probe.as_slice() {
            [vector] if vector.len() == encoder.dimension() => {}
            _ => {
                return Err(ReportError::embedding(format!(
                    "encoder '{}' failed its startup check",
                    encoder.name()
                )))
            }
        }
        info!(
            "Embedding service ready: encoder '{}', dimension {}",
            encoder.name(),
            encoder.dimension()
        );
        Ok(Self { encoder })
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Embed every well-formed item of a parsed request
    pub async fn embed(&self, request: &JsonValue) -> Result<EmbeddingResponse> {
        let items = request
            .get("values")
            .ok_or_else(|| ReportError::embedding(MISSING_VALUES))?
            .as_array()
            .ok_or_else(|| ReportError::embedding("'values' must be a list"))?;

        let records: Vec<TextRecord> = items.iter().filter_map(extract_record).collect();
        debug!(
            "Embedding {} of {} request items",
            records.len(),
            items.len()
        );
        if records.is_empty() {
            return Ok(EmbeddingResponse::default());
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let vectors = self.encoder.encode(&texts).await?;
        if vectors.len() != records.len() {
            return Err(ReportError::embedding(format!(
                "encoder returned {} vectors for {} texts",
                vectors.len(),
                records.len()
            )));
        }

        Ok(EmbeddingResponse {
            values: records
                .into_iter()
                .zip(vectors)
                .map(|(record, vector)| EmbeddedRecord {
                    record_id: record.record_id,
                    data: VectorData { vector },
                })
                .collect(),
        })
    }

    /// Handle a raw JSON request, returning either a response or an error payload
    pub async fn handle(&self, raw: &str) -> JsonValue {
        let result = match serde_json::from_str::<JsonValue>(raw) {
            Ok(request) => self.embed(&request).await,
            Err(e) => Err(ReportError::from(e)),
        };

        match result.and_then(|response| Ok(serde_json::to_value(response)?)) {
            Ok(value) => value,
            Err(e) => {
                error!("Error during processing: {}", e);
                json!(EmbeddingErrorPayload {
                    error: error_message(&e),
                })
            }
        }
    }
}

fn error_message(err: &ReportError) -> String {
    match err {
        ReportError::Embedding { message } => message.clone(),
        other => other.to_string(),
    }
}

fn extract_record(item: &JsonValue) -> Option<TextRecord> {
    let record_id = match item.get("recordId")? {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    let text = item.get("data")?.get("text")?.as_str()?.to_string();
    Some(TextRecord { record_id, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEncoder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenEncoder;

    /// Answers the startup check, then fails every request
    #[derive(Default)]
    struct FlakyEncoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextEncoder for FlakyEncoder {
        fn name(&self) -> &str {
            "flaky"
        }

        fn dimension(&self) -> usize {
            4
        }

        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(texts.iter().map(|_| vec![0.5; 4]).collect())
            } else {
                Err(ReportError::embedding("model backend unavailable"))
            }
        }
    }

    #[async_trait]
    impl TextEncoder for BrokenEncoder {
        fn name(&self) -> &str {
            "broken"
        }

        fn dimension(&self) -> usize {
            8
        }

        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0; 4]).collect())
        }
    }

    async fn service() -> EmbeddingService<HashingEncoder> {
        EmbeddingService::init(HashingEncoder::new(16).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_init_rejects_broken_encoder() {
        assert!(EmbeddingService::init(BrokenEncoder).await.is_err());
    }

    #[tokio::test]
    async fn test_well_formed_items_are_embedded() {
        let service = service().await;
        let request = json!({
            "values": [
                {"recordId": "a", "data": {"text": "vector search"}},
                {"recordId": 7, "data": {"text": "hybrid search"}}
            ]
        });
        let response = service.handle(&request.to_string()).await;
        let values = response["values"].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["recordId"], "a");
        assert_eq!(values[1]["recordId"], "7");
        assert_eq!(values[0]["data"]["vector"].as_array().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_malformed_items_are_skipped() {
        let service = service().await;
        let request = json!({
            "values": [
                {"data": {"text": "no id"}},
                {"recordId": "b"},
                {"recordId": "c", "data": {}},
                {"recordId": "d", "data": {"text": "kept"}}
            ]
        });
        let response = service.embed(&request).await.unwrap();
        assert_eq!(response.values.len(), 1);
        assert_eq!(response.values[0].record_id, "d");
    }

    #[tokio::test]
    async fn test_missing_values_key_returns_error_payload() {
        let service = service().await;
        let response = service.handle(r#"{"items": []}"#).await;
        assert_eq!(response, json!({ "error": MISSING_VALUES }));
    }

    #[tokio::test]
    async fn test_invalid_json_returns_error_payload() {
        let service = service().await;
        let response = service.handle("{not json").await;
        assert!(response["error"].as_str().unwrap().starts_with("JSON error"));
    }

    #[tokio::test]
    async fn test_encoder_failure_returns_error_payload() {
        let service = EmbeddingService::init(FlakyEncoder::default()).await.unwrap();
        let request = json!({
            "values": [{"recordId": "a", "data": {"text": "vector search"}}]
        });

        assert!(service.embed(&request).await.is_err());
        let response = service.handle(&request.to_string()).await;
        assert_eq!(response, json!({ "error": "model backend unavailable" }));
    }

    #[tokio::test]
    async fn test_empty_values_list() {
        let service = service().await;
        let response = service.handle(r#"{"values": []}"#).await;
        assert_eq!(response, json!({ "values": [] }));
    }
}
