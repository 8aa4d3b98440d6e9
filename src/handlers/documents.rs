// src/handlers/documents.rs
//
// Histórico (notas manuais) e documentos anexos de clientes e contratos,
// e o download dos ficheiros guardados.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    db::RecordOwner,
    middleware::auth::SessionScope,
    models::crm::{AttachedDocument, NotePayload},
};

async fn read_file(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid(format!("Falha ao ler o formulário: {}", e)))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid(format!("Falha ao ler o ficheiro: {}", e)))?;
        return Ok((name, data.to_vec()));
    }
    Err(AppError::invalid("Escolha um ficheiro para carregar."))
}

async fn add_note(
    app_state: AppState,
    SessionScope(scope): SessionScope,
    owner: RecordOwner,
    payload: NotePayload,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.crm_service.add_note(&scope, &owner, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn upload(
    app_state: AppState,
    SessionScope(scope): SessionScope,
    owner: RecordOwner,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (file_name, bytes) = read_file(multipart).await?;
    let document = app_state
        .crm_service
        .upload_document(&scope, &owner, &file_name, bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

// =============================================================================
//  CLIENTES
// =============================================================================

// POST /api/clientes/{id}/notas
#[utoipa::path(
    post,
    path = "/api/clientes/{id}/notas",
    tag = "Clientes",
    request_body = NotePayload,
    params(("id" = String, Path, description = "Id do cliente")),
    responses(
        (status = 201, description = "Nota registada no histórico"),
        (status = 400, description = "Nota vazia")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_client_note(
    State(app_state): State<AppState>,
    scope: SessionScope,
    Path(id): Path<String>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, AppError> {
    add_note(app_state, scope, RecordOwner::Client(id), payload).await
}

// POST /api/clientes/{id}/documentos
#[utoipa::path(
    post,
    path = "/api/clientes/{id}/documentos",
    tag = "Clientes",
    params(("id" = String, Path, description = "Id do cliente")),
    responses((status = 201, description = "Documento carregado", body = AttachedDocument)),
    security(("api_jwt" = []))
)]
pub async fn upload_client_document(
    State(app_state): State<AppState>,
    scope: SessionScope,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    upload(app_state, scope, RecordOwner::Client(id), multipart).await
}

// =============================================================================
//  CONTRATOS
// =============================================================================

// POST /api/contratos/{id}/notas
#[utoipa::path(
    post,
    path = "/api/contratos/{id}/notas",
    tag = "Contratos",
    request_body = NotePayload,
    params(("id" = String, Path, description = "Id do contrato")),
    responses(
        (status = 201, description = "Nota registada no histórico"),
        (status = 400, description = "Nota vazia")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_contract_note(
    State(app_state): State<AppState>,
    scope: SessionScope,
    Path(id): Path<String>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, AppError> {
    add_note(app_state, scope, RecordOwner::Contract(id), payload).await
}

// POST /api/contratos/{id}/documentos
#[utoipa::path(
    post,
    path = "/api/contratos/{id}/documentos",
    tag = "Contratos",
    params(("id" = String, Path, description = "Id do contrato")),
    responses((status = 201, description = "Documento carregado", body = AttachedDocument)),
    security(("api_jwt" = []))
)]
pub async fn upload_contract_document(
    State(app_state): State<AppState>,
    scope: SessionScope,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    upload(app_state, scope, RecordOwner::Contract(id), multipart).await
}

// =============================================================================
//  DOWNLOAD
// =============================================================================

// GET /files/{*path}
pub async fn download_file(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = app_state.blobs.download(&path).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}
