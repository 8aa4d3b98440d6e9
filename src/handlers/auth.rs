// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{SessionResponse, SignInRequest},
};

// POST /api/session
#[utoipa::path(
    post,
    path = "/api/session",
    tag = "Sessão",
    request_body = SignInRequest,
    responses(
        (status = 201, description = "Sessão iniciada", body = SessionResponse),
        (status = 401, description = "Token próprio inválido")
    )
)]
pub async fn sign_in(
    State(app_state): State<AppState>,
    payload: Option<Json<SignInRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();

    let session = match request.custom_token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => app_state.session_service.sign_in_with_token(token)?,
        _ => app_state.session_service.sign_in_anonymously()?,
    };

    Ok((StatusCode::CREATED, Json(session)))
}
