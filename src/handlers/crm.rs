// src/handlers/crm.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::SessionScope,
    models::{crm::Client, record::Record},
};

// POST /api/clientes
#[utoipa::path(
    post,
    path = "/api/clientes",
    tag = "Clientes",
    request_body = Client,
    responses(
        (status = 201, description = "Cliente criado"),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "NIF já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Json(payload): Json<Client>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.crm_service.save_client(&scope, None, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// GET /api/clientes/{id}
#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "Id do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<Json<Record<Client>>, AppError> {
    Ok(Json(app_state.crm_service.get_client(&scope, &id).await?))
}

// PUT /api/clientes/{id}
#[utoipa::path(
    put,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    request_body = Client,
    params(("id" = String, Path, description = "Id do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado"),
        (status = 409, description = "NIF já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
    Json(payload): Json<Client>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.crm_service.save_client(&scope, Some(&id), payload).await?;
    Ok((StatusCode::OK, Json(json!({ "id": id }))))
}

// DELETE /api/clientes/{id}
#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "Id do cliente")),
    responses((status = 204, description = "Cliente apagado")),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.crm_service.delete_client(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
