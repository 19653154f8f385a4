//! Settings routes for the reasoning-service key.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

/// The key itself is never echoed back.
#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub is_set: bool,
}

/// GET /api/v1/settings/api-key
pub async fn handle_get_api_key(State(state): State<AppState>) -> Json<ApiKeyStatus> {
    Json(ApiKeyStatus {
        is_set: state.credentials.is_set(),
    })
}

/// PUT /api/v1/settings/api-key
pub async fn handle_put_api_key(
    State(state): State<AppState>,
    Json(request): Json<ApiKeyRequest>,
) -> Result<Json<ApiKeyStatus>, AppError> {
    state.credentials.set(&request.api_key).await?;
    Ok(Json(ApiKeyStatus {
        is_set: state.credentials.is_set(),
    }))
}
