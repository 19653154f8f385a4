use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::errors::AppError;
use crate::models::cover_letter::{CoverLetter, CoverLetterOptions};
use crate::pipeline::analysis::{AnalysisView, ManualEntry};
use crate::pipeline::resume_editor::{Confirmation, ResumeEditorView};
use crate::pipeline::tailoring::TailoringView;
use crate::state::AppState;

/// An empty body means "no options"; anything else must be valid JSON.
fn optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// POST /api/v1/analyze
/// Without a body, extracts from the active tab. With `{text, source}`,
/// analyses the supplied text instead.
pub async fn handle_analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisView>, AppError> {
    let manual: Option<ManualEntry> = optional_json(&body)?;
    Ok(Json(state.pipeline.analyze(manual).await?))
}

/// GET /api/v1/analysis
pub async fn handle_get_analysis(State(state): State<AppState>) -> Json<AnalysisView> {
    Json(state.pipeline.analysis_view())
}

/// POST /api/v1/tailor
pub async fn handle_tailor(State(state): State<AppState>) -> Result<Json<TailoringView>, AppError> {
    Ok(Json(state.pipeline.tailor().await?))
}

/// GET /api/v1/tailor
pub async fn handle_get_tailoring(State(state): State<AppState>) -> Json<TailoringView> {
    Json(state.pipeline.tailoring_view())
}

/// POST /api/v1/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CoverLetter>, AppError> {
    let options: CoverLetterOptions = optional_json(&body)?.unwrap_or_default();
    Ok(Json(state.pipeline.cover_letter(options).await?))
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<ResumeEditorView> {
    Json(state.pipeline.editor().view())
}

/// POST /api/v1/resume/reload
pub async fn handle_reload_resume(
    State(state): State<AppState>,
) -> Result<Json<ResumeEditorView>, AppError> {
    Ok(Json(state.pipeline.editor().load().await?))
}

#[derive(Debug, Deserialize)]
pub struct ResumeTextRequest {
    pub text: String,
}

/// PUT /api/v1/resume/text
pub async fn handle_set_resume_text(
    State(state): State<AppState>,
    Json(req): Json<ResumeTextRequest>,
) -> Json<ResumeEditorView> {
    Json(state.pipeline.editor().set_text(req.text))
}

/// POST /api/v1/resume/save
pub async fn handle_save_resume(
    State(state): State<AppState>,
) -> Result<Json<ResumeEditorView>, AppError> {
    Ok(Json(state.pipeline.editor().save().await?))
}

#[derive(Debug, Deserialize)]
pub struct DeleteResumeQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// DELETE /api/v1/resume?confirm=true
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Query(query): Query<DeleteResumeQuery>,
) -> Result<Json<ResumeEditorView>, AppError> {
    let confirmation = if query.confirm {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    };
    Ok(Json(state.pipeline.editor().delete(confirmation).await?))
}
