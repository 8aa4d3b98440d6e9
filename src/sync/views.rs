// src/sync/views.rs
//
// Cada vista abre os espelhos de que precisa, junta-os com `tokio::select!`
// e recalcula a saída pelos agregadores sempre que um deles muda.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::{
    common::error::AppError,
    db::{
        paths::{RecordOwner, Scope},
        store::DocumentStore,
        ContractsRepository, CrmRepository, FinanceRepository, PartnersRepository, TasksRepository,
    },
    models::{
        contracts::Contract,
        crm::{AttachedDocument, Client, ClientKind, Interaction},
        dashboard::{
            ClientDetailView, ClientsView, ContractDetailView, ContractsView, DashboardView,
            FinanceView, PartnersView, ReportsView, TasksView, TeamView, ViewStatus,
        },
        finance::{BankAccount, Expense},
        partners::{Partner, PartnerKind, TeamMember},
        record::Record,
        reports::ReportFilter,
        tasks::Task,
    },
    services::aggregation,
    sync::mirror::{MirrorReceiver, MirrorSet},
};

// Espera pela próxima publicação de qualquer um dos espelhos.
// `false` quando um canal fechou (a vista está a ser desmontada).
macro_rules! any_changed {
    ($($rx:expr),+ $(,)?) => {
        tokio::select! {
            $( changed = $rx.changed() => changed.is_ok(), )+
        }
    };
}

/// Uma vista ao vivo: um conjunto de espelhos e a forma de os combinar.
#[async_trait]
pub trait LiveView: Send {
    type Output: Serialize + Send;

    async fn changed(&mut self) -> bool;

    fn status(&self) -> ViewStatus;

    fn render(&self) -> Self::Output;

    /// Espera até todos os espelhos terem carregado (ou falhado).
    async fn ready(&mut self) -> bool {
        while self.status().loading {
            if !self.changed().await {
                return false;
            }
        }
        true
    }
}

trait MirrorProbe {
    fn probe(&self, status: &mut ViewStatus);
}

impl<T> MirrorProbe for MirrorReceiver<T> {
    fn probe(&self, status: &mut ViewStatus) {
        let state = self.borrow();
        status.loading |= state.loading;
        if let Some(error) = &state.error {
            status.errors.push(error.clone());
        }
    }
}

fn combined_status(mirrors: &[&dyn MirrorProbe]) -> ViewStatus {
    let mut status = ViewStatus::default();
    for mirror in mirrors {
        mirror.probe(&mut status);
    }
    status
}

/// Cópia dos registos atuais de um espelho. O `borrow` do canal `watch` nunca
/// sobrevive a esta função: duas leituras seguidas do mesmo canal com um
/// `send_replace` pelo meio bloqueiam-se mutuamente.
fn current<T: Clone>(rx: &MirrorReceiver<T>) -> Vec<Record<T>> {
    rx.borrow().records.clone()
}

fn newest_first<T: Clone>(records: &[Record<T>], key: impl Fn(&T) -> &str) -> Vec<Record<T>> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| key(&b.data).cmp(key(&a.data)));
    sorted
}

/// Fábrica das vistas. Guarda o banco e os repositórios que constroem as consultas.
#[derive(Clone)]
pub struct LiveViews {
    store: Arc<dyn DocumentStore>,
    crm: CrmRepository,
    contracts: ContractsRepository,
    tasks: TasksRepository,
    partners: PartnersRepository,
    finance: FinanceRepository,
}

impl LiveViews {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            crm: CrmRepository::new(store.clone()),
            contracts: ContractsRepository::new(store.clone()),
            tasks: TasksRepository::new(store.clone()),
            partners: PartnersRepository::new(store.clone()),
            finance: FinanceRepository::new(store.clone()),
            store,
        }
    }

    pub fn dashboard(&self, scope: &Scope) -> DashboardLive {
        let mut mirrors = MirrorSet::new();
        let contracts = mirrors.open(self.store.clone(), self.contracts.contracts_query(scope), "contratos");
        let tasks = mirrors.open(self.store.clone(), self.tasks.tasks_query(scope), "tarefas");
        DashboardLive { _mirrors: mirrors, contracts, tasks }
    }

    /// Lista de clientes. O tipo vai na consulta; a pesquisa livre é feita sobre o espelho.
    pub fn clients(&self, scope: &Scope, kind: Option<ClientKind>, search: Option<String>) -> ClientsLive {
        let mut query = self.crm.clients_query(scope);
        if let Some(kind) = kind {
            query = query.where_eq("tipoCliente", serde_json::json!(kind));
        }
        let mut mirrors = MirrorSet::new();
        let clients = mirrors.open(self.store.clone(), query, "clientes");
        let sales_reps = mirrors.open(self.store.clone(), self.partners.team_query(scope, true), "comerciais");
        ClientsLive { _mirrors: mirrors, clients, sales_reps, search }
    }

    pub fn client_detail(&self, scope: &Scope, client_id: &str) -> Result<ClientDetailLive, AppError> {
        let owner = RecordOwner::Client(client_id.to_string());
        let interactions_query = self.crm.interactions_query(scope, &owner)?;
        let documents_query = self.crm.documents_query(scope, &owner)?;

        let mut mirrors = MirrorSet::new();
        let clients = mirrors.open(self.store.clone(), self.crm.clients_query(scope), "clientes");
        let contracts = mirrors.open(
            self.store.clone(),
            self.contracts.contracts_of_client_query(scope, client_id),
            "contratos do cliente",
        );
        let interactions = mirrors.open(self.store.clone(), interactions_query, "interações");
        let documents = mirrors.open(self.store.clone(), documents_query, "documentos");
        Ok(ClientDetailLive {
            _mirrors: mirrors,
            client_id: client_id.to_string(),
            clients,
            contracts,
            interactions,
            documents,
        })
    }

    pub fn contracts(&self, scope: &Scope) -> ContractsLive {
        let mut mirrors = MirrorSet::new();
        let contracts = mirrors.open(self.store.clone(), self.contracts.contracts_query(scope), "contratos");
        let clients = mirrors.open(self.store.clone(), self.crm.clients_query(scope), "clientes");
        let sales_reps = mirrors.open(self.store.clone(), self.partners.team_query(scope, true), "comerciais");
        let partners = mirrors.open(self.store.clone(), self.partners.partners_query(scope, None), "parceiros");
        ContractsLive { _mirrors: mirrors, contracts, clients, sales_reps, partners }
    }

    pub fn contract_detail(&self, scope: &Scope, contract_id: &str) -> Result<ContractDetailLive, AppError> {
        let owner = RecordOwner::Contract(contract_id.to_string());
        let interactions_query = self.crm.interactions_query(scope, &owner)?;
        let documents_query = self.crm.documents_query(scope, &owner)?;

        let mut mirrors = MirrorSet::new();
        let contracts = mirrors.open(self.store.clone(), self.contracts.contracts_query(scope), "contratos");
        let interactions = mirrors.open(self.store.clone(), interactions_query, "interações");
        let documents = mirrors.open(self.store.clone(), documents_query, "documentos");
        Ok(ContractDetailLive {
            _mirrors: mirrors,
            contract_id: contract_id.to_string(),
            contracts,
            interactions,
            documents,
        })
    }

    pub fn partners(&self, scope: &Scope, kind: Option<PartnerKind>) -> PartnersLive {
        let mut mirrors = MirrorSet::new();
        let partners = mirrors.open(self.store.clone(), self.partners.partners_query(scope, kind), "parceiros");
        PartnersLive { _mirrors: mirrors, partners }
    }

    pub fn tasks(&self, scope: &Scope) -> TasksLive {
        let mut mirrors = MirrorSet::new();
        let tasks = mirrors.open(self.store.clone(), self.tasks.tasks_query(scope), "tarefas");
        TasksLive { _mirrors: mirrors, tasks }
    }

    pub fn reports(&self, scope: &Scope, filter: ReportFilter) -> ReportsLive {
        let mut mirrors = MirrorSet::new();
        let contracts = mirrors.open(self.store.clone(), self.contracts.contracts_query(scope), "contratos");
        let team = mirrors.open(self.store.clone(), self.partners.team_query(scope, false), "comerciais");
        let partners = mirrors.open(self.store.clone(), self.partners.partners_query(scope, None), "parceiros");
        ReportsLive { _mirrors: mirrors, contracts, team, partners, filter }
    }

    pub fn finance(&self, scope: &Scope) -> FinanceLive {
        let mut mirrors = MirrorSet::new();
        let contracts = mirrors.open(self.store.clone(), self.contracts.contracts_query(scope), "contratos");
        let expenses = mirrors.open(self.store.clone(), self.finance.expenses_query(scope), "despesas");
        let accounts = mirrors.open(self.store.clone(), self.finance.accounts_query(scope), "contas bancárias");
        FinanceLive { _mirrors: mirrors, contracts, expenses, accounts, today: None }
    }

    pub fn team(&self, scope: &Scope, active_only: bool) -> TeamLive {
        let mut mirrors = MirrorSet::new();
        let members = mirrors.open(self.store.clone(), self.partners.team_query(scope, active_only), "equipa");
        TeamLive { _mirrors: mirrors, members }
    }
}

// =========================================================================
//  DASHBOARD
// =========================================================================

pub struct DashboardLive {
    _mirrors: MirrorSet,
    contracts: MirrorReceiver<Contract>,
    tasks: MirrorReceiver<Task>,
}

#[async_trait]
impl LiveView for DashboardLive {
    type Output = DashboardView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.contracts, self.tasks)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.contracts, &self.tasks])
    }

    fn render(&self) -> DashboardView {
        let status = self.status();
        let contracts = current(&self.contracts);
        let tasks = current(&self.tasks);
        DashboardView {
            status,
            summary: aggregation::dashboard_summary(&contracts, &tasks),
        }
    }
}

// =========================================================================
//  CLIENTES
// =========================================================================

pub struct ClientsLive {
    _mirrors: MirrorSet,
    clients: MirrorReceiver<Client>,
    sales_reps: MirrorReceiver<TeamMember>,
    search: Option<String>,
}

#[async_trait]
impl LiveView for ClientsLive {
    type Output = ClientsView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.clients, self.sales_reps)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.clients, &self.sales_reps])
    }

    fn render(&self) -> ClientsView {
        let status = self.status();
        let term = self.search.as_deref().unwrap_or_default();
        let mut clients = current(&self.clients);
        clients.retain(|r| r.data.matches_search(term));
        ClientsView {
            status,
            clients,
            sales_reps: current(&self.sales_reps),
        }
    }
}

pub struct ClientDetailLive {
    _mirrors: MirrorSet,
    client_id: String,
    clients: MirrorReceiver<Client>,
    contracts: MirrorReceiver<Contract>,
    interactions: MirrorReceiver<Interaction>,
    documents: MirrorReceiver<AttachedDocument>,
}

#[async_trait]
impl LiveView for ClientDetailLive {
    type Output = ClientDetailView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.clients, self.contracts, self.interactions, self.documents)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.clients, &self.contracts, &self.interactions, &self.documents])
    }

    fn render(&self) -> ClientDetailView {
        let status = self.status();
        let client = current(&self.clients).into_iter().find(|r| r.id == self.client_id);
        ClientDetailView {
            status,
            client,
            contracts: current(&self.contracts),
            interactions: newest_first(&current(&self.interactions), |i| &i.occurred_at),
            documents: newest_first(&current(&self.documents), |d| &d.uploaded_at),
        }
    }
}

// =========================================================================
//  CONTRATOS
// =========================================================================

pub struct ContractsLive {
    _mirrors: MirrorSet,
    contracts: MirrorReceiver<Contract>,
    clients: MirrorReceiver<Client>,
    sales_reps: MirrorReceiver<TeamMember>,
    partners: MirrorReceiver<Partner>,
}

#[async_trait]
impl LiveView for ContractsLive {
    type Output = ContractsView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.contracts, self.clients, self.sales_reps, self.partners)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.contracts, &self.clients, &self.sales_reps, &self.partners])
    }

    fn render(&self) -> ContractsView {
        let status = self.status();
        ContractsView {
            status,
            contracts: current(&self.contracts),
            clients: current(&self.clients),
            sales_reps: current(&self.sales_reps),
            partners: current(&self.partners),
        }
    }
}

pub struct ContractDetailLive {
    _mirrors: MirrorSet,
    contract_id: String,
    contracts: MirrorReceiver<Contract>,
    interactions: MirrorReceiver<Interaction>,
    documents: MirrorReceiver<AttachedDocument>,
}

#[async_trait]
impl LiveView for ContractDetailLive {
    type Output = ContractDetailView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.contracts, self.interactions, self.documents)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.contracts, &self.interactions, &self.documents])
    }

    fn render(&self) -> ContractDetailView {
        let status = self.status();
        let contract = current(&self.contracts).into_iter().find(|r| r.id == self.contract_id);
        ContractDetailView {
            status,
            contract,
            interactions: newest_first(&current(&self.interactions), |i| &i.occurred_at),
            documents: newest_first(&current(&self.documents), |d| &d.uploaded_at),
        }
    }
}

// =========================================================================
//  PARCEIROS, TAREFAS E EQUIPA
// =========================================================================

pub struct PartnersLive {
    _mirrors: MirrorSet,
    partners: MirrorReceiver<Partner>,
}

#[async_trait]
impl LiveView for PartnersLive {
    type Output = PartnersView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.partners)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.partners])
    }

    fn render(&self) -> PartnersView {
        let status = self.status();
        PartnersView {
            status,
            partners: current(&self.partners),
        }
    }
}

pub struct TasksLive {
    _mirrors: MirrorSet,
    tasks: MirrorReceiver<Task>,
}

#[async_trait]
impl LiveView for TasksLive {
    type Output = TasksView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.tasks)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.tasks])
    }

    fn render(&self) -> TasksView {
        let status = self.status();
        TasksView {
            status,
            board: aggregation::task_board(&current(&self.tasks)),
        }
    }
}

pub struct TeamLive {
    _mirrors: MirrorSet,
    members: MirrorReceiver<TeamMember>,
}

#[async_trait]
impl LiveView for TeamLive {
    type Output = TeamView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.members)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.members])
    }

    fn render(&self) -> TeamView {
        let status = self.status();
        TeamView {
            status,
            members: current(&self.members),
        }
    }
}

// =========================================================================
//  RELATÓRIOS E FINANCEIRO
// =========================================================================

pub struct ReportsLive {
    _mirrors: MirrorSet,
    contracts: MirrorReceiver<Contract>,
    team: MirrorReceiver<TeamMember>,
    partners: MirrorReceiver<Partner>,
    filter: ReportFilter,
}

#[async_trait]
impl LiveView for ReportsLive {
    type Output = ReportsView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.contracts, self.team, self.partners)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.contracts, &self.team, &self.partners])
    }

    fn render(&self) -> ReportsView {
        let status = self.status();
        let results = aggregation::filter_contracts(&current(&self.contracts), &self.filter);
        let partners = current(&self.partners);
        let team = current(&self.team);
        let names_of = |kind: PartnerKind| {
            aggregation::distinct_names(
                partners
                    .iter()
                    .filter(|p| p.data.kind == Some(kind))
                    .map(|p| Some(p.data.name.as_str())),
            )
        };

        ReportsView {
            status,
            totals: aggregation::report_totals(&results),
            volume_by_sales_rep: aggregation::volume_by_sales_rep(&results),
            suppliers: names_of(PartnerKind::Supplier),
            lenders: names_of(PartnerKind::Lender),
            sales_reps: aggregation::distinct_names(team.iter().map(|m| Some(m.data.name.as_str()))),
            results,
        }
    }
}

impl ReportsLive {
    /// Contratos filtrados e o parceiro escolhido no filtro de fornecedor, para o PDF.
    pub fn selection(&self) -> (Vec<Record<Contract>>, Option<Partner>) {
        let results = aggregation::filter_contracts(&current(&self.contracts), &self.filter);
        let partner = self.filter.selected_supplier().and_then(|name| {
            current(&self.partners)
                .into_iter()
                .find(|p| p.data.name == name)
                .map(|p| p.data)
        });
        (results, partner)
    }
}

pub struct FinanceLive {
    _mirrors: MirrorSet,
    contracts: MirrorReceiver<Contract>,
    expenses: MirrorReceiver<Expense>,
    accounts: MirrorReceiver<BankAccount>,
    today: Option<NaiveDate>,
}

impl FinanceLive {
    /// Fixa a data de referência do resumo (por omissão, o dia de hoje).
    pub fn at(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

#[async_trait]
impl LiveView for FinanceLive {
    type Output = FinanceView;

    async fn changed(&mut self) -> bool {
        any_changed!(self.contracts, self.expenses, self.accounts)
    }

    fn status(&self) -> ViewStatus {
        combined_status(&[&self.contracts, &self.expenses, &self.accounts])
    }

    fn render(&self) -> FinanceView {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let status = self.status();
        let contracts = current(&self.contracts);
        let expenses = current(&self.expenses);
        let accounts = current(&self.accounts);
        FinanceView {
            status,
            summary: aggregation::financial_summary(&contracts, &expenses, &accounts, today),
            expenses,
            accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        memory_store::MemoryStore,
        paths::Collection,
        store::Fields,
    };
    use rust_decimal::Decimal;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, LiveViews, Scope) {
        let store = Arc::new(MemoryStore::new());
        let views = LiveViews::new(store.clone());
        (store, views, Scope::new("gestao", "u1"))
    }

    #[tokio::test]
    async fn dashboard_recomputes_when_any_mirror_changes() {
        let (store, views, scope) = setup();
        let contracts = scope.collection(Collection::Contracts);
        let tasks = scope.collection(Collection::Tasks);
        store
            .set(&contracts, "c1", fields(json!({ "tipoServico": "Crédito", "valorFinanciado": 1000 })))
            .await
            .unwrap();

        let mut view = views.dashboard(&scope);
        assert!(view.ready().await);
        let before = view.render();
        assert_eq!(before.summary.credit_volume, Decimal::from(1000));
        assert_eq!(before.summary.resolution_rate, Decimal::ZERO);

        store
            .set(&tasks, "t1", fields(json!({ "titulo": "Ligar", "estado": "Concluído" })))
            .await
            .unwrap();
        while view.render().summary.resolution_rate == Decimal::ZERO {
            assert!(view.changed().await);
        }
        assert_eq!(view.render().summary.resolution_rate, Decimal::from(100));
        assert!(!view.render().status.loading);
    }

    #[tokio::test]
    async fn client_list_filters_by_kind_and_search() {
        let (store, views, scope) = setup();
        let clients = scope.collection(Collection::Clients);
        store
            .set(&clients, "a", fields(json!({ "nome": "Ana Silva", "tipoCliente": "Particular" })))
            .await
            .unwrap();
        store
            .set(&clients, "b", fields(json!({ "nome": "Silva & Filhos", "tipoCliente": "Empresa" })))
            .await
            .unwrap();
        store
            .set(&clients, "c", fields(json!({ "nome": "Bruno", "tipoCliente": "Particular" })))
            .await
            .unwrap();

        let mut view = views.clients(&scope, Some(ClientKind::Particular), Some("silva".into()));
        assert!(view.ready().await);
        let ids: Vec<_> = view.render().clients.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn client_detail_only_mirrors_that_clients_contracts() {
        let (store, views, scope) = setup();
        let clients = scope.collection(Collection::Clients);
        let contracts = scope.collection(Collection::Contracts);
        store.set(&clients, "cli1", fields(json!({ "nome": "Ana" }))).await.unwrap();
        store
            .set(&contracts, "k1", fields(json!({ "clienteId": "cli1" })))
            .await
            .unwrap();
        store
            .set(&contracts, "k2", fields(json!({ "clienteId": "outro" })))
            .await
            .unwrap();

        let mut view = views.client_detail(&scope, "cli1").unwrap();
        assert!(view.ready().await);
        let rendered = view.render();
        assert_eq!(rendered.client.map(|c| c.data.name), Some("Ana".to_string()));
        let ids: Vec<_> = rendered.contracts.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["k1"]);
    }

    #[tokio::test]
    async fn reports_expose_the_selected_supplier() {
        let (store, views, scope) = setup();
        let partners = scope.collection(Collection::Partners);
        let contracts = scope.collection(Collection::Contracts);
        store
            .set(&partners, "p1", fields(json!({ "nome": "Auto Lda", "tipo": "Fornecedor", "nif": "500000000" })))
            .await
            .unwrap();
        store
            .set(
                &contracts,
                "k1",
                fields(json!({ "fornecedor": "Auto Lda", "valorFinanciado": 1000, "comissaoPercentagem": 10 })),
            )
            .await
            .unwrap();
        store
            .set(&contracts, "k2", fields(json!({ "fornecedor": "Outro", "valorFinanciado": 5000 })))
            .await
            .unwrap();

        let filter = ReportFilter {
            fornecedor: "Auto Lda".into(),
            ..Default::default()
        };
        let mut view = views.reports(&scope, filter);
        assert!(view.ready().await);

        let rendered = view.render();
        assert_eq!(rendered.results.len(), 1);
        assert_eq!(rendered.totals.subtotal, Decimal::from(100));
        assert_eq!(rendered.suppliers, vec!["Auto Lda"]);

        let (results, partner) = view.selection();
        assert_eq!(results.len(), 1);
        assert_eq!(partner.and_then(|p| p.nif), Some("500000000".to_string()));
    }

    #[tokio::test]
    async fn finance_view_sums_the_reference_month() {
        let (store, views, scope) = setup();
        let accounts = scope.collection(Collection::BankAccounts);
        let expenses = scope.collection(Collection::Expenses);
        store.set(&accounts, "c1", fields(json!({ "nomeBanco": "CGD", "saldo": 500 }))).await.unwrap();
        store
            .set(
                &expenses,
                "d1",
                fields(json!({ "descricao": "Luz", "valor": 40, "data": "2024-05-10", "contaId": "c1" })),
            )
            .await
            .unwrap();

        let mut view = views
            .finance(&scope)
            .at(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert!(view.ready().await);
        let rendered = view.render();
        assert_eq!(rendered.summary.expenses, Decimal::from(40));
        assert_eq!(rendered.summary.total_balance, Decimal::from(500));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn rendering_keeps_up_with_concurrent_writes() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;

        let (store, views, scope) = setup();
        let mut view = views
            .finance(&scope)
            .at(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert!(view.ready().await);

        let stop = Arc::new(AtomicBool::new(false));
        let mut writers = Vec::new();
        for collection in [Collection::Contracts, Collection::Expenses, Collection::BankAccounts] {
            let store = store.clone();
            let stop = stop.clone();
            let path = scope.collection(collection);
            writers.push(tokio::spawn(async move {
                let mut i: u64 = 0;
                while !stop.load(Ordering::Relaxed) {
                    let doc = fields(json!({ "valor": i, "saldo": i, "data": "2024-05-01" }));
                    store.set(&path, &format!("d{}", i % 4), doc).await.unwrap();
                    i += 1;
                    tokio::task::yield_now().await;
                }
            }));
        }

        let renders = tokio::task::spawn_blocking(move || {
            for _ in 0..5_000 {
                view.render();
            }
        });
        let finished = tokio::time::timeout(Duration::from_secs(30), renders).await;
        stop.store(true, Ordering::Relaxed);
        for writer in writers {
            writer.await.unwrap();
        }
        assert!(finished.is_ok(), "a vista deixou de renderizar durante as escritas");
    }
}
