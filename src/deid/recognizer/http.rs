//! HTTP token-classification recognizer
//!
//! Talks to an inference endpoint using the Hugging Face token-classification
//! wire format: the request is `{"inputs": "<text>"}` and the response is a
//! list of entities:
//!
//! ```json
//! [{"entity_group": "PATIENT", "score": 0.98, "word": "Anna", "start": 0, "end": 4}]
//! ```
//!
//! Token-level responses (`"entity": "B-PATIENT"`) are accepted too; the tag
//! prefix is dropped.

use super::EntityRecognizer;
use crate::config::{RecognizerConfig, SecretString};
use crate::deid::policy::normalize_label;
use crate::deid::span::RecognizedSpan;
use crate::domain::{MedmaskError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recognizer backed by a remote inference endpoint
pub struct HttpRecognizer {
    endpoint: String,
    client: Client,
    api_token: Option<SecretString>,
    min_score: f32,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(default)]
    entity_group: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    word: String,
    #[serde(default = "default_score")]
    score: f32,
}

fn default_score() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Flat(Vec<RawEntity>),
    Batched(Vec<Vec<RawEntity>>),
}

impl HttpRecognizer {
    /// Create a recognizer from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no endpoint is set or the HTTP client
    /// cannot be built.
    pub fn new(config: &RecognizerConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                MedmaskError::Configuration(
                    "recognizer.endpoint is required when recognizer.kind = 'http'".to_string(),
                )
            })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| {
                MedmaskError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            endpoint,
            client,
            api_token: config.api_token.clone(),
            min_score: config.min_score,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn to_spans(&self, text: &str, entities: Vec<RawEntity>) -> Vec<RecognizedSpan> {
        let mut spans = Vec::with_capacity(entities.len());

        for entity in entities {
            let Some(raw_label) = entity.entity_group.or(entity.entity) else {
                tracing::warn!("Recognizer returned an entity without a label");
                continue;
            };
            let (Some(start), Some(end)) = (entity.start, entity.end) else {
                tracing::warn!(label = %raw_label, "Recognizer returned an entity without offsets");
                continue;
            };
            if entity.score < self.min_score {
                tracing::debug!(label = %raw_label, score = entity.score, "Dropping low-score entity");
                continue;
            }

            let mut span = RecognizedSpan::from_text(text, start, end, strip_tag_prefix(&raw_label));
            if span.matched_text.is_empty() {
                span.matched_text = entity.word;
            }
            spans.push(span);
        }

        spans
    }
}

/// Drop IOB/BIOES tag prefixes such as `B-` or `I-`
fn strip_tag_prefix(label: &str) -> String {
    let label = normalize_label(label);
    for prefix in ["B-", "I-", "E-", "S-", "L-", "U-"] {
        if let Some(rest) = label.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    label
}

#[async_trait]
impl EntityRecognizer for HttpRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            MedmaskError::RecognitionUnavailable(format!("Request to recognizer failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MedmaskError::RecognitionUnavailable(format!(
                "Recognizer returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: InferenceResponse = response.json().await.map_err(|e| {
            MedmaskError::RecognitionUnavailable(format!("Invalid recognizer response: {e}"))
        })?;

        let entities = match parsed {
            InferenceResponse::Flat(entities) => entities,
            InferenceResponse::Batched(batches) => batches.into_iter().flatten().collect(),
        };

        let spans = self.to_spans(text, entities);
        tracing::debug!(count = spans.len(), "Recognizer returned spans");
        Ok(spans)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, RecognizerKind};

    fn config_for(url: String) -> RecognizerConfig {
        RecognizerConfig {
            kind: RecognizerKind::Http,
            endpoint: Some(url),
            api_token: Some(secret_string("t0k".to_string())),
            timeout_seconds: 5,
            min_score: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_tag_prefix() {
        assert_eq!(strip_tag_prefix("B-PATIENT"), "PATIENT");
        assert_eq!(strip_tag_prefix("i-doctor"), "DOCTOR");
        assert_eq!(strip_tag_prefix("HOSPITAL"), "HOSPITAL");
    }

    #[tokio::test]
    async fn test_recognize_parses_entity_groups() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "Bearer t0k")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"entity_group": "PATIENT", "score": 0.98, "word": "anna", "start": 0, "end": 4},
                    {"entity_group": "DOCTOR", "score": 0.91, "word": "carl", "start": 9, "end": 13},
                    {"entity_group": "HOSPITAL", "score": 0.2, "word": "today", "start": 14, "end": 19}
                ]"#,
            )
            .create_async()
            .await;

        let recognizer = HttpRecognizer::new(&config_for(server.url())).unwrap();
        let spans = recognizer.recognize("Anna met Carl today").await.unwrap();

        mock.assert_async().await;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], RecognizedSpan::new(0, 4, "PATIENT", "Anna"));
        assert_eq!(spans[1], RecognizedSpan::new(9, 13, "DOCTOR", "Carl"));
    }

    #[tokio::test]
    async fn test_recognize_token_level_and_batched() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"[[{"entity": "B-PHONE", "score": 0.9, "word": "555", "start": 5, "end": 8}]]"#)
            .create_async()
            .await;

        let recognizer = HttpRecognizer::new(&config_for(server.url())).unwrap();
        let spans = recognizer.recognize("Call 555 now").await.unwrap();

        assert_eq!(spans, vec![RecognizedSpan::new(5, 8, "PHONE", "555")]);
    }

    #[tokio::test]
    async fn test_out_of_range_offsets_keep_reported_word() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"[{"entity_group": "PATIENT", "score": 0.9, "word": "Anna", "start": 20, "end": 24}]"#)
            .create_async()
            .await;

        let recognizer = HttpRecognizer::new(&config_for(server.url())).unwrap();
        let spans = recognizer.recognize("Anna").await.unwrap();

        assert_eq!(spans, vec![RecognizedSpan::new(20, 24, "PATIENT", "Anna")]);
    }

    #[tokio::test]
    async fn test_server_error_is_recognition_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body(r#"{"error": "Model is loading"}"#)
            .create_async()
            .await;

        let recognizer = HttpRecognizer::new(&config_for(server.url())).unwrap();
        let err = recognizer.recognize("Anna").await.unwrap_err();

        assert!(err.is_recognition_unavailable());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_recognition_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let recognizer = HttpRecognizer::new(&config_for(server.url())).unwrap();
        let err = recognizer.recognize("Anna").await.unwrap_err();
        assert!(err.is_recognition_unavailable());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_recognition_unavailable() {
        let recognizer =
            HttpRecognizer::new(&config_for("http://127.0.0.1:9/ner".to_string())).unwrap();
        let err = recognizer.recognize("Anna").await.unwrap_err();
        assert!(err.is_recognition_unavailable());
    }
}
