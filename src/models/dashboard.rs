// src/models/dashboard.rs
//
// Saídas dos agregadores. São calculadas a partir dos espelhos e nunca gravadas.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    contracts::Contract,
    crm::{AttachedDocument, Client, Interaction},
    finance::{BankAccount, Expense},
    partners::{Partner, TeamMember},
    record::Record,
    tasks::Task,
};

pub const MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Um ponto do gráfico mensal (um de 12, sempre na ordem Jan..Dez).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVolume {
    #[serde(rename = "name")]
    pub month: &'static str,
    #[serde(rename = "credito")]
    pub credit: Decimal,
    #[serde(rename = "seguros")]
    pub insurance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    #[serde(rename = "volumeTotalCredito")]
    pub credit_volume: Decimal,
    #[serde(rename = "segurosFechados")]
    pub closed_insurance: usize,
    #[serde(rename = "volumeSeguros")]
    pub insurance_volume: Decimal,
    #[serde(rename = "pendentesAtivos")]
    pub pending_tasks: usize,
    #[serde(rename = "taxaResolucao")]
    pub resolution_rate: Decimal,
    #[serde(rename = "dadosGrafico")]
    pub monthly: Vec<MonthlyVolume>,
    #[serde(rename = "volumePorFinanceira")]
    pub volume_by_lender: BTreeMap<String, Decimal>,
    #[serde(rename = "proximasTarefas")]
    pub next_tasks: Vec<Record<Task>>,
}

/// Resumo financeiro do mês corrente.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "comissoesReceber")]
    pub commissions_receivable: Decimal,
    #[serde(rename = "comissoesReceberIva")]
    pub commissions_receivable_with_vat: Decimal,
    #[serde(rename = "comissoesPagar")]
    pub commissions_payable: Decimal,
    #[serde(rename = "comissoesPagarIva")]
    pub commissions_payable_with_vat: Decimal,
    #[serde(rename = "despesasMes")]
    pub expenses: Decimal,
    #[serde(rename = "despesasMesIva")]
    pub expenses_with_vat: Decimal,
    #[serde(rename = "saldoTotal")]
    pub total_balance: Decimal,
    #[serde(rename = "despesasPorCategoria")]
    pub expenses_by_category: BTreeMap<String, Decimal>,
}

/// Quadro de tarefas agrupado por estado.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskBoard {
    #[serde(rename = "Pendente")]
    pub pending: Vec<Record<Task>>,
    #[serde(rename = "Em Andamento")]
    pub in_progress: Vec<Record<Task>>,
    #[serde(rename = "Concluído")]
    pub completed: Vec<Record<Task>>,
}

// --- Vistas enviadas pelos endpoints ao vivo ---

/// Estado comum a todas as vistas: se todos os espelhos já carregaram e os erros de cada um.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewStatus {
    #[serde(rename = "carregando")]
    pub loading: bool,
    #[serde(rename = "erros", skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "resumo")]
    pub summary: DashboardSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientsView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "clientes")]
    pub clients: Vec<Record<Client>>,
    #[serde(rename = "comerciais")]
    pub sales_reps: Vec<Record<TeamMember>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDetailView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "cliente")]
    pub client: Option<Record<Client>>,
    #[serde(rename = "contratos")]
    pub contracts: Vec<Record<Contract>>,
    #[serde(rename = "interacoes")]
    pub interactions: Vec<Record<Interaction>>,
    #[serde(rename = "documentos")]
    pub documents: Vec<Record<AttachedDocument>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractsView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "contratos")]
    pub contracts: Vec<Record<Contract>>,
    #[serde(rename = "clientes")]
    pub clients: Vec<Record<Client>>,
    #[serde(rename = "comerciais")]
    pub sales_reps: Vec<Record<TeamMember>>,
    #[serde(rename = "parceiros")]
    pub partners: Vec<Record<Partner>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractDetailView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "contrato")]
    pub contract: Option<Record<Contract>>,
    #[serde(rename = "interacoes")]
    pub interactions: Vec<Record<Interaction>>,
    #[serde(rename = "documentos")]
    pub documents: Vec<Record<AttachedDocument>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnersView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "parceiros")]
    pub partners: Vec<Record<Partner>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TasksView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "quadro")]
    pub board: TaskBoard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportsView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "resultados")]
    pub results: Vec<Record<Contract>>,
    #[serde(rename = "totais")]
    pub totals: crate::models::reports::ReportTotals,
    #[serde(rename = "volumePorComercial")]
    pub volume_by_sales_rep: BTreeMap<String, Decimal>,
    #[serde(rename = "fornecedores")]
    pub suppliers: Vec<String>,
    #[serde(rename = "financeiras")]
    pub lenders: Vec<String>,
    #[serde(rename = "comerciais")]
    pub sales_reps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "resumo")]
    pub summary: FinancialSummary,
    #[serde(rename = "despesas")]
    pub expenses: Vec<Record<Expense>>,
    #[serde(rename = "contas")]
    pub accounts: Vec<Record<BankAccount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamView {
    #[serde(flatten)]
    pub status: ViewStatus,
    #[serde(rename = "equipa")]
    pub members: Vec<Record<TeamMember>>,
}
