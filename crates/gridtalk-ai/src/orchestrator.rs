//! Orchestrator trait and the Groq chat-completions implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    models::{DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL},
    types::HistoryEntry,
};

/// Default Groq API endpoint (OpenAI-compatible)
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a power systems analysis assistant. \
You help with power flow analysis, bus voltage calculations, system loss analysis, \
and general power system questions. When an image is provided, analyze it in the \
context of the user's question. Show intermediate steps for numeric work.";

/// The reasoning capability consumed by the chat front-end.
///
/// Given the current prompt, an optional encoded image, and the windowed
/// conversation history, produce a textual answer. Implementations may call a
/// hosted model, run a numeric solver, or search the web; callers only see
/// the answer or an [`Error`].
#[async_trait]
pub trait Orchestrate: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        image: Option<&str>,
        history: &[HistoryEntry],
    ) -> Result<String>;
}

/// Groq-backed orchestrator using the OpenAI-compatible chat completions API.
///
/// Text-only requests go to the configured text model; requests carrying an
/// image go to the vision model, with the image inlined as a base64 data URL.
pub struct GroqOrchestrator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    vision_model: String,
    system_prompt: String,
}

impl GroqOrchestrator {
    /// Create a new orchestrator with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Create from the GROQ_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the text model
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Override the vision model
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Override the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    fn build_request(
        &self,
        prompt: &str,
        image: Option<&str>,
        history: &[HistoryEntry],
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);

        messages.push(WireMessage {
            role: "system".to_string(),
            content: WireContent::Text(self.system_prompt.clone()),
        });

        for entry in history {
            messages.push(WireMessage {
                role: entry.role.as_str().to_string(),
                content: WireContent::Text(entry.content.clone()),
            });
        }

        // The current prompt is the final user message. An attached image is
        // inlined next to it; history never carries images.
        let (model, content) = match image {
            Some(encoded) => (
                self.vision_model.clone(),
                WireContent::Parts(vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{}", encoded),
                        },
                    },
                ]),
            ),
            None => (self.text_model.clone(), WireContent::Text(prompt.to_string())),
        };

        messages.push(WireMessage {
            role: "user".to_string(),
            content,
        });

        ChatRequest {
            model,
            messages,
            temperature: None,
            stream: false,
        }
    }
}

#[async_trait]
impl Orchestrate for GroqOrchestrator {
    async fn invoke(
        &self,
        prompt: &str,
        image: Option<&str>,
        history: &[HistoryEntry],
    ) -> Result<String> {
        let request = self.build_request(prompt, image, history);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            model = %request.model,
            history_len = history.len(),
            has_image = image.is_some(),
            "sending orchestrator request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => Error::api(parsed.error.error_type, parsed.error.message),
                Err(_) => Error::api(status.as_str().to_string(), body),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::UnexpectedResponse("response contained no choices".to_string()))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: WireContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type", default)]
    error_type: String,
    message: String,
}
