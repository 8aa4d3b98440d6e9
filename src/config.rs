// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::{
    db::{
        BlobStore, ContractsRepository, CrmRepository, DocumentStore, FinanceRepository,
        LocalBlobStore, MemoryStore, PartnersRepository, PgDocumentStore, Scope, TasksRepository,
    },
    services::{
        hooks::{HookChain, MissingDocumentsTaskHook, TaskInteractionHook},
        ContractService, CrmService, FinanceService, PartnerService, ReportIssuer, ReportService,
        SessionService, TaskService,
    },
    sync::views::LiveViews,
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub namespace: String,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub blob_dir: PathBuf,
    pub blob_public_url: String,
    pub pdf_fonts_dir: PathBuf,
    pub pdf_font_family: String,
    pub issuer: ReportIssuer,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            bind_addr: var_or("APP_BIND_ADDR", "0.0.0.0:3000"),
            namespace: var_or("APP_NAMESPACE", "gestao"),
            jwt_secret,
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            blob_dir: PathBuf::from(var_or("BLOB_DIR", "./uploads")),
            blob_public_url: var_or("BLOB_PUBLIC_URL", "/files"),
            pdf_fonts_dir: PathBuf::from(var_or("PDF_FONTS_DIR", "./fonts")),
            pdf_font_family: var_or("PDF_FONT_FAMILY", "Roboto"),
            issuer: ReportIssuer {
                name: var_or("REPORT_ISSUER_NAME", ""),
                nif: var_or("REPORT_ISSUER_NIF", ""),
                address: var_or("REPORT_ISSUER_ADDRESS", ""),
                title: var_or("REPORT_ISSUER_TITLE", ""),
                signoff: var_or("REPORT_SIGNOFF", "OBRIGADA"),
            },
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub namespace: String,
    pub blobs: Arc<dyn BlobStore>,
    pub live: LiveViews,
    pub session_service: SessionService,
    pub crm_service: CrmService,
    pub contract_service: ContractService,
    pub task_service: TaskService,
    pub partner_service: PartnerService,
    pub finance_service: FinanceService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &settings.database_url {
            Some(url) => {
                let store = PgDocumentStore::connect(url).await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: a usar o banco em memória");
                Arc::new(MemoryStore::new())
            }
        };
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            settings.blob_dir.clone(),
            &settings.blob_public_url,
        ));

        Ok(Self::with_stores(settings, store, blobs))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_stores(settings: &Settings, store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let crm_repo = CrmRepository::new(store.clone());
        let contracts_repo = ContractsRepository::new(store.clone());
        let tasks_repo = TasksRepository::new(store.clone());
        let partners_repo = PartnersRepository::new(store.clone());
        let finance_repo = FinanceRepository::new(store.clone());

        let contract_hooks = HookChain::new().with(MissingDocumentsTaskHook::new(tasks_repo.clone()));
        let task_hooks = HookChain::new().with(TaskInteractionHook::new(crm_repo.clone()));

        Self {
            namespace: settings.namespace.clone(),
            live: LiveViews::new(store),
            session_service: SessionService::new(settings.jwt_secret.clone()),
            crm_service: CrmService::new(crm_repo.clone(), blobs.clone()),
            contract_service: ContractService::new(contracts_repo, crm_repo, contract_hooks),
            task_service: TaskService::new(tasks_repo, task_hooks),
            partner_service: PartnerService::new(partners_repo),
            finance_service: FinanceService::new(finance_repo),
            report_service: ReportService::new(
                settings.pdf_fonts_dir.clone(),
                settings.pdf_font_family.clone(),
                settings.issuer.clone(),
            ),
            blobs,
        }
    }

    /// Âmbito dos dados de um utilizador da sessão.
    pub fn scope(&self, user_id: &str) -> Scope {
        Scope::new(self.namespace.clone(), user_id)
    }
}
