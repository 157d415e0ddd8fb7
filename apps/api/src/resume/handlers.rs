use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ResumeStore, Settings, SettingsUpdate};
use crate::resume::ai_adapter::ai_result_to_markdown;
use crate::resume::markdown::{parse_markdown, to_markdown};
use crate::resume::txt_parser::parse_txt;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TxtRequest {
    #[serde(default)]
    pub txt: String,
}

impl TxtRequest {
    fn text(&self) -> Result<&str, AppError> {
        if self.txt.trim().is_empty() {
            return Err(AppError::Validation("No txt provided".to_string()));
        }
        Ok(&self.txt)
    }
}

#[derive(Deserialize)]
pub struct MarkdownRequest {
    pub markdown: String,
}

#[derive(Serialize)]
pub struct MarkdownResponse {
    pub markdown: String,
}

/// POST /api/parse-resume
/// Raw structured JSON from the remote parser.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(req): Json<TxtRequest>,
) -> Result<Json<Value>, AppError> {
    let parsed = state.resume_parser.parse(req.text()?).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/resume/import/ai
pub async fn handle_import_ai(
    State(state): State<AppState>,
    Json(req): Json<TxtRequest>,
) -> Result<Json<MarkdownResponse>, AppError> {
    info!("AI import requested (model: {})", state.config.llm_model);
    let parsed = state.resume_parser.parse(req.text()?).await?;
    Ok(Json(MarkdownResponse {
        markdown: ai_result_to_markdown(&parsed),
    }))
}

/// POST /api/v1/resume/import/text
pub async fn handle_import_text(
    Json(req): Json<TxtRequest>,
) -> Result<Json<MarkdownResponse>, AppError> {
    let parsed = parse_txt(req.text()?);
    info!(
        "Text import: {} fields, {} unplaced blocks",
        parsed.fields.len(),
        parsed.unknown.len()
    );
    Ok(Json(MarkdownResponse {
        markdown: parsed.to_markdown(),
    }))
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<ResumeStore> {
    Json(state.store.snapshot().await.resume_data.clone())
}

/// PUT /api/v1/resume
/// Parses the markdown and replaces the stored résumé wholesale.
pub async fn handle_put_resume(
    State(state): State<AppState>,
    Json(req): Json<MarkdownRequest>,
) -> Result<Json<ResumeStore>, AppError> {
    let resume = parse_markdown(&req.markdown);
    if resume.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "parse produced nothing".to_string(),
        ));
    }
    info!("Replacing resume: {} sections", resume.len());
    state.store.replace_resume(resume.clone()).await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resume
pub async fn handle_clear_resume(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear().await?;
    info!("Resume and settings cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resume/markdown
pub async fn handle_get_markdown(State(state): State<AppState>) -> Json<MarkdownResponse> {
    let snapshot = state.store.snapshot().await;
    Json(MarkdownResponse {
        markdown: to_markdown(&snapshot.resume_data, &[]),
    })
}

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.settings().await)
}

/// PUT /api/v1/settings
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Settings>, AppError> {
    let settings = state.store.update_settings(update).await?;
    Ok(Json(settings))
}
