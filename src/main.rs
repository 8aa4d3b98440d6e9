//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod sync;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

fn api_routes(app_state: &AppState) -> Router<AppState> {
    let client_routes = Router::new()
        .route("/", post(handlers::crm::create_client))
        .route(
            "/{id}",
            get(handlers::crm::get_client)
                .put(handlers::crm::update_client)
                .delete(handlers::crm::delete_client),
        )
        .route("/{id}/notas", post(handlers::documents::add_client_note))
        .route("/{id}/documentos", post(handlers::documents::upload_client_document));

    let contract_routes = Router::new()
        .route("/", post(handlers::contracts::create_contract))
        .route(
            "/{id}",
            get(handlers::contracts::get_contract)
                .put(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        )
        .route("/{id}/notas", post(handlers::documents::add_contract_note))
        .route("/{id}/documentos", post(handlers::documents::upload_contract_document));

    let task_routes = Router::new()
        .route("/", post(handlers::tasks::create_task))
        .route(
            "/{id}",
            axum::routing::put(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        .route("/{id}/concluir", post(handlers::tasks::complete_task))
        .route("/{id}/reabrir", post(handlers::tasks::reopen_task))
        .route("/{id}/alternar", post(handlers::tasks::toggle_task));

    let partner_routes = Router::new()
        .route(
            "/",
            get(handlers::partners::list_partners).post(handlers::partners::create_partner),
        )
        .route(
            "/{id}",
            axum::routing::put(handlers::partners::update_partner)
                .delete(handlers::partners::delete_partner),
        );

    let team_routes = Router::new()
        .route("/", post(handlers::partners::create_member))
        .route("/{id}", axum::routing::put(handlers::partners::update_member))
        .route("/{id}/estado", post(handlers::partners::toggle_member));

    let finance_routes = Router::new()
        .route(
            "/despesas",
            post(handlers::finance::create_expense).get(handlers::finance::list_expenses),
        )
        .route(
            "/contas",
            post(handlers::finance::create_account).get(handlers::finance::list_accounts),
        )
        .route("/resumo", get(handlers::dashboard::get_financial_summary));

    let live_routes = Router::new()
        .route("/dashboard", get(handlers::live::dashboard))
        .route("/clientes", get(handlers::live::clients))
        .route("/clientes/{id}", get(handlers::live::client_detail))
        .route("/contratos", get(handlers::live::contracts))
        .route("/contratos/{id}", get(handlers::live::contract_detail))
        .route("/parceiros", get(handlers::live::partners))
        .route("/tarefas", get(handlers::live::tasks))
        .route("/relatorios", get(handlers::live::reports))
        .route("/financeiro", get(handlers::live::finance))
        .route("/utilizadores", get(handlers::live::team));

    // Tudo o que está aqui exige sessão
    Router::new()
        .nest("/clientes", client_routes)
        .nest("/contratos", contract_routes)
        .nest("/tarefas", task_routes)
        .nest("/parceiros", partner_routes)
        .nest("/utilizadores", team_routes)
        .nest("/financeiro", finance_routes)
        .route("/relatorios/pdf", get(handlers::reports::download_pdf))
        .route("/dashboard", get(handlers::dashboard::get_summary))
        .nest("/live", live_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao instalar o handler de Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 A terminar o servidor...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/session", post(handlers::auth::sign_in))
        .route("/files/{*path}", get(handlers::documents::download_file))
        .nest("/api", api_routes(&app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
