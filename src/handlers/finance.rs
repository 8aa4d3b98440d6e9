// src/handlers/finance.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::SessionScope,
    models::finance::{BankAccount, Expense},
};

// POST /api/financeiro/despesas
#[utoipa::path(
    post,
    path = "/api/financeiro/despesas",
    tag = "Financeiro",
    request_body = Expense,
    responses(
        (status = 201, description = "Despesa registada e debitada na conta"),
        (status = 400, description = "Dados inválidos ou conta inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Json(payload): Json<Expense>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.finance_service.create_expense(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// GET /api/financeiro/despesas
#[utoipa::path(
    get,
    path = "/api/financeiro/despesas",
    tag = "Financeiro",
    responses((status = 200, description = "Despesas", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.finance_service.list_expenses(&scope).await?;
    Ok((StatusCode::OK, Json(expenses)))
}

// POST /api/financeiro/contas
#[utoipa::path(
    post,
    path = "/api/financeiro/contas",
    tag = "Financeiro",
    request_body = BankAccount,
    responses((status = 201, description = "Conta bancária criada")),
    security(("api_jwt" = []))
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Json(payload): Json<BankAccount>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.finance_service.create_account(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// GET /api/financeiro/contas
#[utoipa::path(
    get,
    path = "/api/financeiro/contas",
    tag = "Financeiro",
    responses((status = 200, description = "Contas bancárias", body = Vec<BankAccount>)),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Result<impl IntoResponse, AppError> {
    let accounts = app_state.finance_service.list_accounts(&scope).await?;
    Ok((StatusCode::OK, Json(accounts)))
}
