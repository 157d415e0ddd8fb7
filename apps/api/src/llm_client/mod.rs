/// LLM Client. The single point of entry for every chat-completions call in the service.
///
/// Talks to an OpenAI-compatible endpoint (DashScope compatible mode by default).
/// No other module may call the remote model directly.
///
/// One attempt per call. Failures are reported to the caller, never retried.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_MODEL: &str = "qwen-turbo";
const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.1;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const API_KEY_PREFIX: &str = "sk-";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not set")]
    MissingApiKey,

    #[error("Invalid API key format, expected a key starting with 'sk-'")]
    InvalidApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client shared by all services.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The configured key, checked before any request leaves the process.
    fn api_key(&self) -> Result<&str, LlmError> {
        match self.api_key.as_deref() {
            None | Some("") => Err(LlmError::MissingApiKey),
            Some(key) if !key.starts_with(API_KEY_PREFIX) => Err(LlmError::InvalidApiKey),
            Some(key) => Ok(key),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Makes a raw chat-completions call, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key()?;

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(llm_response)
    }

    /// Calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(|e| {
            warn!("LLM returned non-JSON content: {text}");
            LlmError::Parse(e)
        })
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences (anywhere in the output)
/// and single wrapping backticks from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(start) = text.find("```json") {
        let inner = &text[start + "```json".len()..];
        return match inner.find("```") {
            Some(end) => inner[..end].trim(),
            None => inner.trim(),
        };
    }
    if let Some(stripped) = text.strip_prefix("```") {
        return stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start());
    }
    if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
        return text[1..text.len() - 1].trim();
    }
    text
}
