// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sessão ---
        handlers::auth::sign_in,

        // --- Clientes ---
        handlers::crm::create_client,
        handlers::crm::get_client,
        handlers::crm::update_client,
        handlers::crm::delete_client,
        handlers::documents::add_client_note,
        handlers::documents::upload_client_document,

        // --- Contratos ---
        handlers::contracts::create_contract,
        handlers::contracts::get_contract,
        handlers::contracts::update_contract,
        handlers::contracts::delete_contract,
        handlers::documents::add_contract_note,
        handlers::documents::upload_contract_document,

        // --- Tarefas ---
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::complete_task,
        handlers::tasks::reopen_task,
        handlers::tasks::toggle_task,
        handlers::tasks::delete_task,

        // --- Parceiros e equipa ---
        handlers::partners::list_partners,
        handlers::partners::create_partner,
        handlers::partners::update_partner,
        handlers::partners::delete_partner,
        handlers::partners::create_member,
        handlers::partners::update_member,
        handlers::partners::toggle_member,

        // --- Financeiro ---
        handlers::finance::create_expense,
        handlers::finance::list_expenses,
        handlers::finance::create_account,
        handlers::finance::list_accounts,
        handlers::dashboard::get_financial_summary,

        // --- Dashboard e relatórios ---
        handlers::dashboard::get_summary,
        handlers::reports::download_pdf,

        // --- Tempo real ---
        handlers::live::dashboard,
        handlers::live::clients,
        handlers::live::client_detail,
        handlers::live::contracts,
        handlers::live::contract_detail,
        handlers::live::partners,
        handlers::live::tasks,
        handlers::live::reports,
        handlers::live::finance,
        handlers::live::team,
    ),
    components(
        schemas(
            // --- Sessão ---
            models::auth::SignInRequest,
            models::auth::SessionResponse,

            // --- CRM ---
            models::crm::ClientKind,
            models::crm::Client,
            models::crm::InteractionKind,
            models::crm::Interaction,
            models::crm::AttachedDocument,
            models::crm::NotePayload,

            // --- Contratos e tarefas ---
            models::contracts::ServiceType,
            models::contracts::ContractState,
            models::contracts::Contract,
            models::tasks::Priority,
            models::tasks::TaskState,
            models::tasks::Task,
            services::hooks::SaveOutcome,

            // --- Parceiros ---
            models::partners::PartnerKind,
            models::partners::Partner,
            models::partners::MemberState,
            models::partners::TeamMember,

            // --- Financeiro ---
            models::finance::Expense,
            models::finance::BankAccount,
            models::reports::ReportFilter,
            models::reports::ReportTotals,
        )
    ),
    tags(
        (name = "Sessão", description = "Entrada anónima ou com token próprio"),
        (name = "Clientes", description = "Clientes, histórico e documentos"),
        (name = "Contratos", description = "Contratos de crédito, seguros, legalizações e consultoria"),
        (name = "Tarefas", description = "Tarefas da equipa"),
        (name = "Parceiros", description = "Fornecedores, financeiras e seguradoras"),
        (name = "Equipa", description = "Membros da equipa comercial"),
        (name = "Financeiro", description = "Despesas, contas bancárias e resumo do mês"),
        (name = "Dashboard", description = "Indicadores e gráficos"),
        (name = "Relatórios", description = "Relatório de prestação de serviços em PDF"),
        (name = "Tempo real", description = "Vistas ao vivo por Server-Sent Events")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
