//! Gemini REST client implementing [`TextGenerator`].
//!
//! Calls `POST {endpoint}/models/{model}:generateContent` with a single user
//! turn. When grounding is requested the Google Search tool is attached;
//! the sources the model consulted are written to the activity log and never
//! added to the returned text.
//!
//! ## Error mapping
//!
//! | Response | Error |
//! |----------|-------|
//! | no key configured | [`GenerationError::ApiKeyMissing`] |
//! | message contains "API key not valid" | [`GenerationError::ApiKeyInvalid`] |
//! | 403 or message mentions "permission" | [`GenerationError::PermissionDenied`] |
//! | 429 | [`GenerationError::RateLimited`] |
//! | other non-2xx | [`GenerationError::Api`] |
//! | client timeout | [`GenerationError::Timeout`] |
//! | connection / decode failure | [`GenerationError::Transport`] |
//! | no text parts | [`GenerationError::EmptyResponse`] |

use super::TextGenerator;
use crate::activity::{ActivitySink, Level};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const MODULE: &str = "GeminiClient";
const UNTITLED_SOURCE: &str = "Untitled Source";

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: SamplingConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplingConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// A web page the model consulted through search grounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub(crate) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    /// Web sources of the first candidate that has any.
    pub(crate) fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .iter()
            .filter_map(|c| c.grounding_metadata.as_ref())
            .find(|m| !m.grounding_chunks.is_empty())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
                        Some(GroundingSource {
                            title: web
                                .title
                                .clone()
                                .filter(|t| !t.is_empty())
                                .unwrap_or_else(|| UNTITLED_SOURCE.to_string()),
                            uri: uri.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Map a non-success HTTP response to a [`GenerationError`].
pub(crate) fn map_api_error(status: u16, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if message.contains("API key not valid") {
        GenerationError::ApiKeyInvalid
    } else if status == 403 || message.to_lowercase().contains("permission") {
        GenerationError::PermissionDenied
    } else if status == 429 {
        GenerationError::RateLimited
    } else {
        GenerationError::Api { status, message }
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GenerationConfig,
    activity: Arc<dyn ActivitySink>,
}

impl GeminiClient {
    /// Build a client. Fails only if the HTTP client cannot be created.
    pub fn new(
        config: GenerationConfig,
        activity: Arc<dyn ActivitySink>,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout())
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if config.api_key.is_some() {
            activity.record(Level::Info, MODULE, "new", "Gemini API key found.", None);
        } else {
            activity.record(
                Level::Error,
                MODULE,
                "new",
                "Gemini API key is not set; generation calls will fail.",
                None,
            );
        }

        Ok(Self {
            http,
            config,
            activity,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    pub(crate) fn request_body<'a>(
        &self,
        prompt: &'a str,
        use_grounding: bool,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: SamplingConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
            tools: if use_grounding {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
        }
    }

    async fn call(&self, prompt: &str, use_grounding: bool) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenerationError::ApiKeyMissing)?;

        let start = Instant::now();
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(prompt, use_grounding))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(
            "Gemini responded {} in {}ms ({} bytes)",
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Transport(format!("Invalid response body: {e}")))?;

        if use_grounding {
            self.log_grounding(&parsed);
        }

        parsed.text().ok_or(GenerationError::EmptyResponse)
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout {
                secs: self.config.api_timeout_secs,
            }
        } else {
            GenerationError::Transport(e.to_string())
        }
    }

    fn log_grounding(&self, response: &GenerateContentResponse) {
        let sources = response.grounding_sources();
        if sources.is_empty() {
            self.activity.record(
                Level::Info,
                MODULE,
                "generate",
                "Search grounding was enabled, but no web sources were returned.",
                None,
            );
        } else {
            self.activity.record(
                Level::Info,
                MODULE,
                "generate",
                "Search grounding sources found.",
                Some(serde_json::json!({ "sources": sources })),
            );
        }
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, use_grounding: bool) -> Result<String, GenerationError> {
        self.activity.record(
            Level::Info,
            MODULE,
            "generate",
            "Requesting content generation.",
            Some(serde_json::json!({
                "model": self.config.model,
                "useSearchGrounding": use_grounding,
                "promptLength": prompt.len(),
            })),
        );

        match self.call(prompt, use_grounding).await {
            Ok(text) => {
                self.activity.record(
                    Level::Info,
                    MODULE,
                    "generate",
                    "Successfully generated content.",
                    Some(serde_json::json!({ "outputLength": text.len() })),
                );
                Ok(text)
            }
            Err(e) => {
                warn!("Gemini call failed: {}", e);
                self.activity.record(
                    Level::Error,
                    MODULE,
                    "generate",
                    "Error calling Gemini API.",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityLog, NoopSink};

    fn client(config: GenerationConfig) -> GeminiClient {
        GeminiClient::new(config, Arc::new(NoopSink)).unwrap()
    }

    #[test]
    fn request_body_wire_format() {
        let c = client(GenerationConfig::default());
        let body = serde_json::to_value(c.request_body("Hello", true)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }],
                "generationConfig": { "temperature": 0.6f32, "topP": 0.9f32, "topK": 40 },
                "tools": [{ "googleSearch": {} }]
            })
        );
    }

    #[test]
    fn tools_omitted_without_grounding() {
        let c = client(GenerationConfig::default());
        let body = serde_json::to_value(c.request_body("Hello", false)).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn url_uses_endpoint_and_model() {
        let config = GenerationConfig::builder()
            .endpoint("http://localhost:9999/v1beta")
            .model("gemini-test")
            .build()
            .unwrap();
        assert_eq!(
            client(config).url(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn response_text_and_sources() {
        let raw = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "COMPANY_NAME: Acme\n" }, { "text": "Dear team," }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://acme.example/about", "title": "About Acme" } },
                    { "web": { "uri": "https://acme.example/jobs" } },
                    { "web": { "title": "No link" } }
                ] }
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("COMPANY_NAME: Acme\nDear team,"));
        assert_eq!(
            parsed.grounding_sources(),
            vec![
                GroundingSource {
                    title: "About Acme".into(),
                    uri: "https://acme.example/about".into()
                },
                GroundingSource {
                    title: "Untitled Source".into(),
                    uri: "https://acme.example/jobs".into()
                },
            ]
        );
    }

    #[test]
    fn empty_candidates_have_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), None);
        assert!(parsed.grounding_sources().is_empty());
    }

    #[test]
    fn error_mapping() {
        let invalid = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(map_api_error(400, invalid), GenerationError::ApiKeyInvalid);
        assert_eq!(map_api_error(403, "{}"), GenerationError::PermissionDenied);
        assert_eq!(
            map_api_error(400, r#"{"error":{"message":"Caller lacks permission for tool"}}"#),
            GenerationError::PermissionDenied
        );
        assert_eq!(map_api_error(429, "slow down"), GenerationError::RateLimited);
        assert_eq!(
            map_api_error(500, "backend overloaded"),
            GenerationError::Api {
                status: 500,
                message: "backend overloaded".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let log = Arc::new(ActivityLog::in_memory());
        let c = GeminiClient::new(GenerationConfig::default(), log.clone()).unwrap();
        let err = c.generate("prompt", false).await.unwrap_err();
        assert_eq!(err, GenerationError::ApiKeyMissing);
        let text = log.format_as_text();
        assert!(text.contains("[ERROR] GeminiClient.new"));
        assert!(text.contains("[ERROR] GeminiClient.generate - Error calling Gemini API."));
    }
}
