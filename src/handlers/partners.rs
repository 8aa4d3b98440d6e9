// src/handlers/partners.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::SessionScope,
    models::partners::{MemberState, Partner, PartnerKind, TeamMember},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KindQuery {
    /// Fornecedor, Financeira ou Seguradora
    pub tipo: PartnerKind,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OptionalKindQuery {
    #[serde(default)]
    pub tipo: Option<PartnerKind>,
}

// =============================================================================
//  PARCEIROS
// =============================================================================

// GET /api/parceiros
#[utoipa::path(
    get,
    path = "/api/parceiros",
    tag = "Parceiros",
    params(OptionalKindQuery),
    responses((status = 200, description = "Parceiros", body = Vec<Partner>)),
    security(("api_jwt" = []))
)]
pub async fn list_partners(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(query): Query<OptionalKindQuery>,
) -> Result<impl IntoResponse, AppError> {
    let partners = app_state.partner_service.list_partners(&scope, query.tipo).await?;
    Ok((StatusCode::OK, Json(partners)))
}

// POST /api/parceiros?tipo=Fornecedor
#[utoipa::path(
    post,
    path = "/api/parceiros",
    tag = "Parceiros",
    params(KindQuery),
    request_body = Partner,
    responses(
        (status = 201, description = "Parceiro criado"),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_partner(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(query): Query<KindQuery>,
    Json(payload): Json<Partner>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state
        .partner_service
        .save_partner(&scope, query.tipo, None, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// PUT /api/parceiros/{id}?tipo=Fornecedor
#[utoipa::path(
    put,
    path = "/api/parceiros/{id}",
    tag = "Parceiros",
    params(("id" = String, Path, description = "Id do parceiro"), KindQuery),
    request_body = Partner,
    responses((status = 200, description = "Parceiro atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_partner(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
    Query(query): Query<KindQuery>,
    Json(payload): Json<Partner>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state
        .partner_service
        .save_partner(&scope, query.tipo, Some(&id), payload)
        .await?;
    Ok((StatusCode::OK, Json(json!({ "id": id }))))
}

// DELETE /api/parceiros/{id}
#[utoipa::path(
    delete,
    path = "/api/parceiros/{id}",
    tag = "Parceiros",
    params(("id" = String, Path, description = "Id do parceiro")),
    responses((status = 204, description = "Parceiro apagado")),
    security(("api_jwt" = []))
)]
pub async fn delete_partner(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.partner_service.delete_partner(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  EQUIPA
// =============================================================================

// POST /api/utilizadores
#[utoipa::path(
    post,
    path = "/api/utilizadores",
    tag = "Equipa",
    request_body = TeamMember,
    responses(
        (status = 201, description = "Membro criado (ativo)"),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Json(payload): Json<TeamMember>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.partner_service.save_member(&scope, None, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// PUT /api/utilizadores/{id}
#[utoipa::path(
    put,
    path = "/api/utilizadores/{id}",
    tag = "Equipa",
    params(("id" = String, Path, description = "Id do membro")),
    request_body = TeamMember,
    responses((status = 200, description = "Membro atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
    Json(payload): Json<TeamMember>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.partner_service.save_member(&scope, Some(&id), payload).await?;
    Ok((StatusCode::OK, Json(json!({ "id": id }))))
}

// POST /api/utilizadores/{id}/estado
#[utoipa::path(
    post,
    path = "/api/utilizadores/{id}/estado",
    tag = "Equipa",
    params(("id" = String, Path, description = "Id do membro")),
    responses((status = 200, description = "Ativo <-> Inativo", body = MemberState)),
    security(("api_jwt" = []))
)]
pub async fn toggle_member(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let state = app_state.partner_service.toggle_member(&scope, &id).await?;
    Ok((StatusCode::OK, Json(json!({ "estado": state }))))
}
