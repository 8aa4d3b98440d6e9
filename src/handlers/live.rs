// src/handlers/live.rs
//
// Vistas ao vivo por Server-Sent Events: um evento `snapshot` com a vista inteira
// sempre que o resultado muda. Fechar a ligação larga a vista e as subscrições.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::SessionScope,
    models::{crm::ClientKind, partners::PartnerKind, reports::ReportFilter},
    sync::views::LiveView,
};

/// Transforma uma vista num stream SSE. Só emite quando o JSON muda.
pub fn live_stream<V>(mut view: V) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    V: LiveView + 'static,
{
    let stream = async_stream::stream! {
        let mut last: Option<String> = None;
        loop {
            match serde_json::to_string(&view.render()) {
                Ok(json) if last.as_deref() != Some(json.as_str()) => {
                    yield Ok(Event::default().event("snapshot").data(json.clone()));
                    last = Some(json);
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Falha ao serializar a vista: {}", e),
            }
            if !view.changed().await {
                break;
            }
        }
        tracing::info!("Vista ao vivo terminada");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Leitura única de uma vista: espera pelo primeiro carregamento e devolve o resultado.
pub async fn snapshot<V: LiveView>(mut view: V) -> Result<V::Output, AppError> {
    if !view.ready().await {
        return Err(AppError::BackendUnavailable("a vista foi fechada antes de carregar".into()));
    }
    Ok(view.render())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientsQuery {
    #[serde(default, rename = "tipoCliente")]
    pub kind: Option<ClientKind>,
    #[serde(default, rename = "pesquisa")]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PartnersQuery {
    #[serde(default)]
    pub tipo: Option<PartnerKind>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamQuery {
    // Por omissão só os ativos (é a lista dos selects de comercial)
    #[serde(default, rename = "todos")]
    pub all: bool,
}

// =============================================================================
//  VISTAS
// =============================================================================

// GET /api/live/dashboard
#[utoipa::path(
    get,
    path = "/api/live/dashboard",
    tag = "Tempo real",
    responses((status = 200, description = "Stream SSE de DashboardView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.dashboard(&scope))
}

// GET /api/live/clientes
#[utoipa::path(
    get,
    path = "/api/live/clientes",
    tag = "Tempo real",
    params(ClientsQuery),
    responses((status = 200, description = "Stream SSE de ClientsView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn clients(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(query): Query<ClientsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.clients(&scope, query.kind, query.search))
}

// GET /api/live/clientes/{id}
#[utoipa::path(
    get,
    path = "/api/live/clientes/{id}",
    tag = "Tempo real",
    params(("id" = String, Path, description = "Id do cliente")),
    responses((status = 200, description = "Stream SSE de ClientDetailView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn client_detail(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    Ok(live_stream(app_state.live.client_detail(&scope, &id)?))
}

// GET /api/live/contratos
#[utoipa::path(
    get,
    path = "/api/live/contratos",
    tag = "Tempo real",
    responses((status = 200, description = "Stream SSE de ContractsView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn contracts(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.contracts(&scope))
}

// GET /api/live/contratos/{id}
#[utoipa::path(
    get,
    path = "/api/live/contratos/{id}",
    tag = "Tempo real",
    params(("id" = String, Path, description = "Id do contrato")),
    responses((status = 200, description = "Stream SSE de ContractDetailView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn contract_detail(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    Ok(live_stream(app_state.live.contract_detail(&scope, &id)?))
}

// GET /api/live/parceiros
#[utoipa::path(
    get,
    path = "/api/live/parceiros",
    tag = "Tempo real",
    params(PartnersQuery),
    responses((status = 200, description = "Stream SSE de PartnersView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn partners(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(query): Query<PartnersQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.partners(&scope, query.tipo))
}

// GET /api/live/tarefas
#[utoipa::path(
    get,
    path = "/api/live/tarefas",
    tag = "Tempo real",
    responses((status = 200, description = "Stream SSE de TasksView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn tasks(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.tasks(&scope))
}

// GET /api/live/relatorios
#[utoipa::path(
    get,
    path = "/api/live/relatorios",
    tag = "Tempo real",
    params(ReportFilter),
    responses((status = 200, description = "Stream SSE de ReportsView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn reports(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(filter): Query<ReportFilter>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.reports(&scope, filter))
}

// GET /api/live/financeiro
#[utoipa::path(
    get,
    path = "/api/live/financeiro",
    tag = "Tempo real",
    responses((status = 200, description = "Stream SSE de FinanceView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn finance(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.finance(&scope))
}

// GET /api/live/utilizadores
#[utoipa::path(
    get,
    path = "/api/live/utilizadores",
    tag = "Tempo real",
    params(TeamQuery),
    responses((status = 200, description = "Stream SSE de TeamView", content_type = "text/event-stream")),
    security(("api_jwt" = []))
)]
pub async fn team(
    State(app_state): State<AppState>,
    SessionScope(scope): SessionScope,
    Query(query): Query<TeamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(app_state.live.team(&scope, !query.all))
}
