use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::backend::ExternalCredential;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

fn session_view(state: &AppState) -> SessionView {
    let session = state.pipeline.session();
    SessionView {
        is_authenticated: session.is_authenticated(),
        user: session.user(),
    }
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(session_view(&state))
}

/// POST /api/v1/session
/// Body is `{"id_token": "..."}` or `{"access_token": "..."}`.
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(credential): Json<ExternalCredential>,
) -> Result<Json<SessionView>, AppError> {
    state.pipeline.sign_in(&credential).await?;
    Ok(Json(session_view(&state)))
}

/// DELETE /api/v1/session
pub async fn handle_sign_out(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.pipeline.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
