//! Remote résumé parsing. Pluggable, trait-based text to structured JSON.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::resume::prompts::{build_parse_prompt, RESUME_PARSE_SYSTEM};

/// Turns free-form résumé text into the section/field JSON described by
/// `REMOTE_SECTION_FIELDS`.
///
/// Carried in `AppState` as `Arc<dyn ResumeTextParser>`.
#[async_trait]
pub trait ResumeTextParser: Send + Sync {
    async fn parse(&self, txt: &str) -> Result<Value, AppError>;
}

/// Parser backed by the chat-completions model.
pub struct LlmResumeParser(pub LlmClient);

#[async_trait]
impl ResumeTextParser for LlmResumeParser {
    async fn parse(&self, txt: &str) -> Result<Value, AppError> {
        info!(
            "Remote resume parse: {} chars via {}",
            txt.chars().count(),
            self.0.model()
        );
        let parsed: Value = self
            .0
            .call_json(&build_parse_prompt(txt), RESUME_PARSE_SYSTEM)
            .await?;
        if !parsed.is_object() {
            return Err(AppError::UnprocessableEntity(
                "Remote parser did not return a JSON object".to_string(),
            ));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, DEFAULT_BASE_URL, DEFAULT_MODEL};

    #[tokio::test]
    async fn test_missing_key_surfaces_as_llm_error() {
        let client = LlmClient::new(None, DEFAULT_BASE_URL, DEFAULT_MODEL).unwrap();
        let err = LlmResumeParser(client).parse("张三").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::MissingApiKey)));
    }
}
