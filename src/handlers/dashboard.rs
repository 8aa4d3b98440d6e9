// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::live::snapshot,
    middleware::auth::SessionScope,
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Indicadores do dashboard")),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Result<impl IntoResponse, AppError> {
    let view = snapshot(app_state.live.dashboard(&scope)).await?;
    Ok((StatusCode::OK, Json(view)))
}

// GET /api/financeiro/resumo
#[utoipa::path(
    get,
    path = "/api/financeiro/resumo",
    tag = "Financeiro",
    responses((status = 200, description = "Resumo financeiro do mês corrente")),
    security(("api_jwt" = []))
)]
pub async fn get_financial_summary(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Result<impl IntoResponse, AppError> {
    let view = snapshot(app_state.live.finance(&scope)).await?;
    Ok((StatusCode::OK, Json(view)))
}
