//! HTTP client for the hosted `generateContent` model API.

use crate::{GenerationError, TextGenerator};
use serde::{Deserialize, Serialize};
use tracing::debug;
use venue_core::config::DEFAULT_MODEL;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone)]
pub struct HostedModelClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl HostedModelClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            model: model
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from the `API_KEY` environment variable.
    pub fn from_env(model: Option<String>) -> Result<Self, GenerationError> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;
        Ok(Self::new(key, model, None))
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl TextGenerator for HostedModelClient {
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, GenerationError> {
        let model = model.unwrap_or(&self.model);
        let endpoint = self.endpoint(model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        debug!(%model, prompt_chars = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Decode(e.to_string()))?;
        let out = parsed.text();
        if out.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{request_advisory, AdvisoryRequest, CallSite};
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> HostedModelClient {
        HostedModelClient::new("test-key".into(), Some("test-model".into()), Some(server.base_url()))
    }

    #[test]
    fn model_defaults_when_blank() {
        let c = HostedModelClient::new("k".into(), Some("  ".into()), None);
        assert_eq!(c.model_id(), DEFAULT_MODEL);
        assert_eq!(
            c.endpoint("m"),
            format!("{DEFAULT_BASE_URL}/models/m:generateContent")
        );
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/test-model:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .body_contains("Analyze matchday ROI");
                then.status(200).json_body(json!({
                    "candidates": [
                        { "content": { "parts": [ { "text": "Cut " }, { "text": "energy costs." } ] } }
                    ]
                }));
            })
            .await;

        let out = client(&server)
            .generate("Analyze matchday ROI", None)
            .await
            .unwrap();
        assert_eq!(out, "Cut energy costs.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn model_override_changes_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/other:generateContent");
                then.status(200).json_body(json!({
                    "candidates": [ { "content": { "parts": [ { "text": "ok" } ] } } ]
                }));
            })
            .await;
        let out = client(&server).generate("p", Some("other")).await.unwrap();
        assert_eq!(out, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("overloaded");
            })
            .await;
        let err = client(&server).generate("p", None).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Status {
                status: 503,
                body: "overloaded".into()
            }
        );
    }

    #[tokio::test]
    async fn empty_candidates_are_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;
        let err = client(&server).generate("p", None).await.unwrap_err();
        assert_eq!(err, GenerationError::Empty);
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("not json");
            })
            .await;
        let c = client(&server);
        let req = AdvisoryRequest {
            site: CallSite::MediaBriefing,
            prompt: "p".into(),
        };
        let out = request_advisory(&c, &req, None).await;
        assert_eq!(out.text(), "Media report generation failed.");
        mock.assert_hits_async(1).await;
    }
}
