// src/handlers/tasks.rs

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
    models::tasks::Task,
    services::hooks::SaveOutcome,
};

// POST /api/tarefas
#[utoipa::path(
    post,
    path = "/api/tarefas",
    tag = "Tarefas",
    request_body = Task,
    responses(
        (status = 201, description = "Tarefa criada", body = SaveOutcome),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Json(payload): Json<Task>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.task_service.save(&scope, None, payload).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

// PUT /api/tarefas/{id}
#[utoipa::path(
    put,
    path = "/api/tarefas/{id}",
    tag = "Tarefas",
    request_body = Task,
    params(("id" = String, Path, description = "Id da tarefa")),
    responses((status = 200, description = "Tarefa atualizada", body = SaveOutcome)),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
    Json(payload): Json<Task>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.task_service.save(&scope, Some(&id), payload).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// POST /api/tarefas/{id}/concluir
#[utoipa::path(
    post,
    path = "/api/tarefas/{id}/concluir",
    tag = "Tarefas",
    params(("id" = String, Path, description = "Id da tarefa")),
    responses(
        (status = 200, description = "Tarefa concluída", body = SaveOutcome),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_task(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.task_service.complete(&scope, &id).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// POST /api/tarefas/{id}/reabrir
#[utoipa::path(
    post,
    path = "/api/tarefas/{id}/reabrir",
    tag = "Tarefas",
    params(("id" = String, Path, description = "Id da tarefa")),
    responses((status = 204, description = "Tarefa de novo pendente")),
    security(("api_jwt" = []))
)]
pub async fn reopen_task(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.task_service.reopen(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/tarefas/{id}/alternar
#[utoipa::path(
    post,
    path = "/api/tarefas/{id}/alternar",
    tag = "Tarefas",
    params(("id" = String, Path, description = "Id da tarefa")),
    responses((status = 200, description = "Pendente <-> Concluído", body = SaveOutcome)),
    security(("api_jwt" = []))
)]
pub async fn toggle_task(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.task_service.toggle(&scope, &id).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// DELETE /api/tarefas/{id}
#[utoipa::path(
    delete,
    path = "/api/tarefas/{id}",
    tag = "Tarefas",
    params(("id" = String, Path, description = "Id da tarefa")),
    responses((status = 204, description = "Tarefa apagada")),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.task_service.delete(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
