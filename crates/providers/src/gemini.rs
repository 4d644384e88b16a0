use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::agent_api::ChatMessage;
use shared::patent::{GeoLocation, GroundingSource};
use shared::settings::AppSettings;
use std::time::Duration;

/// API key header. The key stays out of URLs, which reqwest echoes in errors.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 800;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Gemini API key not configured (set GEMINI_API_KEY or gemini.api_key in settings)")]
    MissingApiKey,

    #[error("gemini error: {status}\n{message}")]
    Http { status: StatusCode, message: String },
}

/// Retrieval tool the service may use to ground its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grounding {
    Search,
    Maps,
}

/// One outbound generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<ChatMessage>,
    /// When set, the response is requested as JSON matching this schema.
    pub response_schema: Option<serde_json::Value>,
    pub grounding: Option<Grounding>,
    /// Retrieval bias; omitted from the request entirely when `None`.
    pub location: Option<GeoLocation>,
    pub thinking_budget: Option<u32>,
}

impl GenerateRequest {
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::from_history(model, vec![ChatMessage::user(prompt)])
    }

    pub fn from_history(model: impl Into<String>, contents: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            contents,
            response_schema: None,
            grounding: None,
            location: None,
            thinking_budget: None,
        }
    }

    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_grounding(mut self, grounding: Grounding) -> Self {
        self.grounding = Some(grounding);
        self
    }

    pub fn with_location(mut self, location: Option<GeoLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    pub(crate) fn to_body(&self) -> GeminiRequest {
        let contents = self
            .contents
            .iter()
            .map(|m| GeminiContent {
                role: m.role.as_str().to_string(),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let generation_config = if self.response_schema.is_some() || self.thinking_budget.is_some()
        {
            Some(GenerationConfig {
                response_mime_type: self
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json".to_string()),
                response_schema: self.response_schema.clone(),
                thinking_config: self.thinking_budget.map(|thinking_budget| ThinkingConfig {
                    thinking_budget,
                }),
            })
        } else {
            None
        };

        let tools = match self.grounding {
            Some(Grounding::Search) => vec![GeminiTool {
                google_search: Some(EmptyObject {}),
                google_maps: None,
            }],
            Some(Grounding::Maps) => vec![GeminiTool {
                google_search: None,
                google_maps: Some(EmptyObject {}),
            }],
            None => Vec::new(),
        };

        let tool_config = self.location.map(|lat_lng| ToolConfig {
            retrieval_config: RetrievalConfig { lat_lng },
        });

        GeminiRequest {
            contents,
            generation_config,
            tools,
            tool_config,
        }
    }
}

/// Text and citations extracted from the first response candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Anything that can serve a [`GenerateRequest`].
#[async_trait]
pub trait GenerateContent: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_maps: Option<EmptyObject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: GeoLocation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<ChunkSource>,
    maps: Option<ChunkSource>,
}

#[derive(Debug, Deserialize)]
struct ChunkSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiResponse {
    /// Collapse the first candidate into text plus citations. Web chunks are
    /// read for search grounding, map chunks for maps grounding.
    pub(crate) fn into_response(self, grounding: Option<Grounding>) -> GenerateResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return GenerateResponse::default();
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let sources = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| match grounding {
                        Some(Grounding::Maps) => chunk.maps,
                        _ => chunk.web,
                    })
                    .map(|s| GroundingSource {
                        uri: s.uri.unwrap_or_default(),
                        title: s.title.unwrap_or_default(),
                    })
                    .filter(|s| !s.uri.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        GenerateResponse { text, sources }
    }
}

fn error_message(body: &str) -> String {
    let body = body.trim();
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let message = envelope.error.message.unwrap_or_default();
        return match envelope.error.status {
            Some(status) if !status.is_empty() => format!("{status}: {message}"),
            _ => message,
        };
    }
    if body.chars().count() > MAX_ERROR_BODY {
        let truncated: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{truncated}...")
    } else {
        body.to_string()
    }
}

// ── Client ───────────────────────────────────────────────────────────

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        Self::from_settings_with(settings, |name| std::env::var(name).ok())
    }

    /// Like [`Self::from_settings`], resolving environment variables through `lookup`.
    pub fn from_settings_with(
        settings: &AppSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let key = settings
            .api_key_with(lookup)
            .ok_or(GeminiError::MissingApiKey)?;
        Self::new(
            key,
            settings.gemini.base_url.clone(),
            Duration::from_secs(settings.gemini.timeout_secs),
        )
    }
}

#[async_trait]
impl GenerateContent for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/{}:generateContent", self.base_url, request.model);
        tracing::debug!(model = %request.model, grounding = ?request.grounding, "gemini request");

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request.to_body())
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Http {
                status,
                message: error_message(&body),
            }
            .into());
        }

        let body: GeminiResponse = resp.json().await?;
        Ok(body.into_response(request.grounding))
    }
}
