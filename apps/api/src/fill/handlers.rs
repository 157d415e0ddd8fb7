use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dom::SnapshotNode;
use crate::errors::AppError;
use crate::fill::{form_stats, FillOptions, FillReport, FormStats};
use crate::state::AppState;

/// What asked for the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillTrigger {
    #[default]
    Manual,
    PageLoad,
    ContextMenu,
}

/// Why a requested pass did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AutoFillDisabled,
    NoResume,
}

#[derive(Deserialize)]
pub struct FillRequest {
    pub document: SnapshotNode,
    #[serde(default)]
    pub trigger: FillTrigger,
}

#[derive(Serialize)]
pub struct FillResponse {
    pub trigger: FillTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FillReport>,
}

#[derive(Deserialize)]
pub struct StatsRequest {
    pub document: SnapshotNode,
}

/// POST /api/v1/fill
/// Runs one fill pass against the posted snapshot.
pub async fn handle_fill(
    State(state): State<AppState>,
    Json(req): Json<FillRequest>,
) -> Result<Json<FillResponse>, AppError> {
    let snapshot = state.store.snapshot().await;
    let skipped = |reason: SkipReason| -> Result<Json<FillResponse>, AppError> {
        info!("Fill ({:?}) not run: {:?}", req.trigger, reason);
        Ok(Json(FillResponse {
            trigger: req.trigger,
            skipped: Some(reason),
            report: None,
        }))
    };

    if req.trigger == FillTrigger::PageLoad && !snapshot.settings.auto_fill {
        return skipped(SkipReason::AutoFillDisabled);
    }
    if snapshot.resume_data.is_empty() {
        return skipped(SkipReason::NoResume);
    }

    let options = FillOptions {
        show_notification: snapshot.settings.show_notification,
    };
    let filler = Arc::clone(&state.filler);
    let trigger = req.trigger;
    let document = req.document;
    let report = tokio::task::spawn_blocking(move || {
        filler.fill(&snapshot.resume_data, &document, options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed for fill pass: {e}")))?;

    Ok(Json(FillResponse {
        trigger,
        skipped: None,
        report: Some(report),
    }))
}

/// POST /api/v1/fill/stats
pub async fn handle_form_stats(Json(req): Json<StatsRequest>) -> Json<FormStats> {
    Json(form_stats(&req.document))
}
