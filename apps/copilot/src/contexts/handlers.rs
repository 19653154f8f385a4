//! Routes the browser shim uses to report tabs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::contexts::tabs::TabInfo;
use crate::errors::AppError;
use crate::extractor::PageSnapshot;
use crate::router::TabId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttachTabRequest {
    #[serde(flatten)]
    pub snapshot: PageSnapshot,
    /// `false` for pages where no content script can run.
    #[serde(default = "default_scriptable")]
    pub scriptable: bool,
}

fn default_scriptable() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct AttachTabResponse {
    pub tab_id: TabId,
}

/// POST /api/v1/tabs
pub async fn handle_attach_tab(
    State(state): State<AppState>,
    Json(req): Json<AttachTabRequest>,
) -> Result<(StatusCode, Json<AttachTabResponse>), AppError> {
    if req.snapshot.url.trim().is_empty() {
        return Err(AppError::Validation("url must not be empty".to_string()));
    }
    let tab_id = state.tabs.attach(req.snapshot, req.scriptable);
    Ok((StatusCode::CREATED, Json(AttachTabResponse { tab_id })))
}

/// GET /api/v1/tabs
pub async fn handle_list_tabs(State(state): State<AppState>) -> Json<Vec<TabInfo>> {
    Json(state.tabs.list())
}

/// PUT /api/v1/tabs/:id
pub async fn handle_update_tab(
    State(state): State<AppState>,
    Path(id): Path<TabId>,
    Json(snapshot): Json<PageSnapshot>,
) -> Result<StatusCode, AppError> {
    state.tabs.update(id, snapshot)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tabs/:id/activate
pub async fn handle_activate_tab(
    State(state): State<AppState>,
    Path(id): Path<TabId>,
) -> Result<StatusCode, AppError> {
    state.tabs.activate(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/tabs/:id
pub async fn handle_close_tab(
    State(state): State<AppState>,
    Path(id): Path<TabId>,
) -> Result<StatusCode, AppError> {
    state.tabs.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}
