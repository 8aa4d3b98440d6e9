// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Local;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::SessionScope,
    models::reports::ReportFilter,
    sync::views::LiveView,
};

// GET /api/relatorios/pdf
#[utoipa::path(
    get,
    path = "/api/relatorios/pdf",
    tag = "Relatórios",
    params(ReportFilter),
    responses(
        (status = 200, description = "Relatório em PDF", content_type = "application/pdf"),
        (status = 503, description = "Gerador de PDF indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_pdf(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, AppError> {
    let file_name = filter.file_name();

    let mut view = app_state.live.reports(&scope, filter);
    if !view.ready().await {
        return Err(AppError::BackendUnavailable("os contratos não carregaram".into()));
    }
    let (contracts, partner) = view.selection();
    drop(view);

    let layout = app_state
        .report_service
        .layout(&contracts, partner.as_ref(), Local::now().date_naive());

    // genpdf é síncrono
    let service = app_state.report_service.clone();
    let bytes = tokio::task::spawn_blocking(move || service.render(&layout))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task do PDF: {}", e))??;

    tracing::info!("📄 {} enviado ({} contratos)", file_name, contracts.len());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}
