// src/handlers/contracts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::SessionScope,
    models::{contracts::Contract, record::Record},
    services::hooks::SaveOutcome,
};

// POST /api/contratos
#[utoipa::path(
    post,
    path = "/api/contratos",
    tag = "Contratos",
    request_body = Contract,
    responses(
        (status = 201, description = "Contrato criado (avisos dos efeitos secundários incluídos)", body = SaveOutcome),
        (status = 400, description = "Dados inválidos ou cliente inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Json(payload): Json<Contract>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.contract_service.save(&scope, None, payload).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

// GET /api/contratos/{id}
#[utoipa::path(
    get,
    path = "/api/contratos/{id}",
    tag = "Contratos",
    params(("id" = String, Path, description = "Id do contrato")),
    responses(
        (status = 200, description = "Contrato", body = Contract),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<Json<Record<Contract>>, AppError> {
    Ok(Json(app_state.contract_service.get(&scope, &id).await?))
}

// PUT /api/contratos/{id}
#[utoipa::path(
    put,
    path = "/api/contratos/{id}",
    tag = "Contratos",
    request_body = Contract,
    params(("id" = String, Path, description = "Id do contrato")),
    responses((status = 200, description = "Contrato atualizado", body = SaveOutcome)),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
    Json(payload): Json<Contract>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.contract_service.save(&scope, Some(&id), payload).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// DELETE /api/contratos/{id}
#[utoipa::path(
    delete,
    path = "/api/contratos/{id}",
    tag = "Contratos",
    params(("id" = String, Path, description = "Id do contrato")),
    responses((status = 204, description = "Contrato apagado")),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contract_service.delete(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
