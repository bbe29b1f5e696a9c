//! Client for the Gemini `generateContent` REST endpoint.
//!
//! Only the slice of the wire format the check-in needs is modelled: text and inline image
//! parts on the way out, candidate text and web grounding chunks on the way back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::response::Resource;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("no API key configured; set API_KEY or pass --api-key")]
    MissingApiKey,
    #[error("model service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model service returned no text")]
    EmptyReply,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
    pub tools: Vec<Tool>,
}

impl GenerateContentRequest {
    pub fn has_image(&self) -> bool {
        self.contents
            .iter()
            .flat_map(|content| &content.parts)
            .any(|part| matches!(part, Part::InlineData { .. }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: GoogleSearch,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: GoogleSearch {},
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReplyPart {
    text: Option<String>,
    thought: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

/// What the analysis pipeline needs from a model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub citations: Vec<Resource>,
}

impl GenerateContentResponse {
    /// Reply text of the first candidate plus its web citations, in order.
    pub fn into_reply(self) -> ModelReply {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelReply::default();
        };
        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty());
        let citations = candidate
            .grounding_metadata
            .map(|meta| meta.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .filter_map(|web| {
                let uri = web.uri?;
                let title = web.title.unwrap_or_else(|| uri.clone());
                Some(Resource::new(title, uri))
            })
            .collect();
        ModelReply { text, citations }
    }
}

/// Anything that can answer a `generateContent` request.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<ModelReply, GeminiError>;
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            api_key,
            model: config.model,
            url,
            client: builder.build()?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnalysisBackend for GeminiClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<ModelReply, GeminiError> {
        debug!(model = %self.model, has_image = request.has_image(), "Calling generateContent");
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent returned an error status");
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let reply = payload.into_reply();
        debug!(
            text_len = reply.text.as_ref().map_or(0, String::len),
            citations = reply.citations.len(),
            "generateContent replied"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_joins_text_and_collects_web_chunks() {
        let raw = r#"{
          "candidates": [{
            "content": {"role": "model", "parts": [
              {"text": "thinking...", "thought": true},
              {"text": "```json\n{\"symptomSummary\": "},
              {"text": "\"itchy\"}\n```"}
            ]},
            "groundingMetadata": {"groundingChunks": [
              {"web": {"uri": "https://www.aad.org/a", "title": "aad.org"}},
              {"retrievedContext": {"uri": "ignored"}},
              {"web": {"uri": "https://nea.org/b"}},
              {"web": {"title": "no uri"}}
            ]}
          }]
        }"#;
        let reply = serde_json::from_str::<GenerateContentResponse>(raw)
            .unwrap()
            .into_reply();
        assert_eq!(
            reply.text.as_deref(),
            Some("```json\n{\"symptomSummary\": \"itchy\"}\n```")
        );
        assert_eq!(
            reply.citations,
            vec![
                Resource::new("aad.org", "https://www.aad.org/a"),
                Resource::new("https://nea.org/b", "https://nea.org/b"),
            ]
        );
    }

    #[test]
    fn blocked_reply_has_no_text() {
        let raw = r#"{"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}}"#;
        let reply = serde_json::from_str::<GenerateContentResponse>(raw)
            .unwrap()
            .into_reply();
        assert_eq!(reply, ModelReply::default());
    }

    #[test]
    fn client_requires_api_key() {
        let err = GeminiClient::new(GeminiConfig::default()).err().unwrap();
        assert!(matches!(err, GeminiError::MissingApiKey));

        let blank = GeminiConfig {
            api_key: Some("  ".to_string()),
            ..GeminiConfig::default()
        };
        assert!(matches!(
            GeminiClient::new(blank).err().unwrap(),
            GeminiError::MissingApiKey
        ));
    }

    #[test]
    fn client_targets_model_endpoint() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("key".to_string()),
            endpoint: "http://localhost:9999/".to_string(),
            ..GeminiConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.url,
            "http://localhost:9999/v1beta/models/gemini-3-pro-preview:generateContent"
        );
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = GeminiConfig {
            api_key: Some("secret-key".to_string()),
            ..GeminiConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
