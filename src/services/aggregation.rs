// src/services/aggregation.rs
//
// Agregadores puros: recebem os registos espelhados e devolvem valores prontos a mostrar.
// Nada aqui lê relógios ou estado escondido; a data de referência entra como argumento.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::lenient::parse_date,
    models::{
        contracts::{Contract, ContractState, ServiceType},
        dashboard::{DashboardSummary, FinancialSummary, MonthlyVolume, TaskBoard, MONTHS},
        finance::{BankAccount, Expense},
        record::Record,
        reports::{ReportFilter, ReportTotals, ALL},
        tasks::{Task, TaskState},
    },
};

/// IVA aplicado às comissões e despesas: 23%.
pub const VAT_RATE: Decimal = Decimal::from_parts(23, 0, 0, false, 2);

/// Número de tarefas pendentes mostradas no dashboard.
pub const NEXT_TASKS: usize = 3;

/// Soma que satura no máximo do `Decimal` em vez de rebentar com montantes absurdos.
pub fn total(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

// =========================================================================
//  CONTRATOS
// =========================================================================

/// 12 baldes fixos (Jan..Dez) pelo mês de `dataContrato`, independentemente do ano.
/// Crédito soma o valor financiado, Seguro soma o prémio. Datas ilegíveis ficam de fora.
pub fn monthly_volume(contracts: &[Record<Contract>]) -> Vec<MonthlyVolume> {
    let mut buckets: Vec<MonthlyVolume> = MONTHS
        .iter()
        .map(|&month| MonthlyVolume {
            month,
            credit: Decimal::ZERO,
            insurance: Decimal::ZERO,
        })
        .collect();

    for contract in contracts.iter().map(|r| &r.data) {
        let Some(date) = contract.date() else { continue };
        let bucket = &mut buckets[date.month0() as usize];
        match contract.service_type {
            Some(ServiceType::Credit) => {
                bucket.credit = bucket.credit.saturating_add(contract.financed_amount.unwrap_or_default())
            }
            Some(ServiceType::Insurance) => {
                bucket.insurance = bucket.insurance.saturating_add(contract.premium.unwrap_or_default())
            }
            _ => {}
        }
    }
    buckets
}

pub fn credit_volume(contracts: &[Record<Contract>]) -> Decimal {
    total(
        contracts
            .iter()
            .filter(|r| r.data.is(ServiceType::Credit))
            .map(|r| r.data.financed_amount.unwrap_or_default()),
    )
}

pub fn insurance_volume(contracts: &[Record<Contract>]) -> Decimal {
    total(
        contracts
            .iter()
            .filter(|r| r.data.is(ServiceType::Insurance))
            .map(|r| r.data.premium.unwrap_or_default()),
    )
}

/// Seguros fechados: tipo Seguro no estado Concluído.
pub fn closed_insurance_count(contracts: &[Record<Contract>]) -> usize {
    contracts
        .iter()
        .filter(|r| r.data.is(ServiceType::Insurance) && r.data.state == ContractState::Completed)
        .count()
}

/// Soma agrupada por uma chave de texto. Chaves vazias são ignoradas;
/// montantes em falta contam zero. O resultado vem ordenado pela chave.
pub fn grouped_totals<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> Option<&str>,
    amount: impl Fn(&T) -> Option<Decimal>,
) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for item in items {
        let Some(group) = key(item).map(str::trim).filter(|k| !k.is_empty()) else {
            continue;
        };
        let sum = totals.entry(group.to_string()).or_insert(Decimal::ZERO);
        *sum = sum.saturating_add(amount(item).unwrap_or_default());
    }
    totals
}

/// Volume de crédito por financeira (só contratos de Crédito).
pub fn volume_by_lender(contracts: &[Record<Contract>]) -> BTreeMap<String, Decimal> {
    grouped_totals(
        contracts.iter().map(|r| &r.data).filter(|c| c.is(ServiceType::Credit)),
        |c| c.lender.as_deref(),
        |c| c.financed_amount,
    )
}

/// Valor financiado por comercial.
pub fn volume_by_sales_rep(contracts: &[Record<Contract>]) -> BTreeMap<String, Decimal> {
    grouped_totals(
        contracts.iter().map(|r| &r.data),
        |c| c.sales_rep.as_deref(),
        |c| c.financed_amount,
    )
}

// =========================================================================
//  TAREFAS
// =========================================================================

/// Percentagem de tarefas concluídas. Sem tarefas, a taxa é 0.
pub fn resolution_rate(tasks: &[Record<Task>]) -> Decimal {
    if tasks.is_empty() {
        return Decimal::ZERO;
    }
    let completed = tasks.iter().filter(|t| t.data.is_completed()).count();
    (Decimal::from(completed) * Decimal::ONE_HUNDRED / Decimal::from(tasks.len())).round_dp(2)
}

pub fn pending_count(tasks: &[Record<Task>]) -> usize {
    tasks.iter().filter(|t| t.data.state == TaskState::Pending).count()
}

pub fn next_pending_tasks(tasks: &[Record<Task>], limit: usize) -> Vec<Record<Task>> {
    tasks
        .iter()
        .filter(|t| t.data.state == TaskState::Pending)
        .take(limit)
        .cloned()
        .collect()
}

pub fn task_board(tasks: &[Record<Task>]) -> TaskBoard {
    let mut board = TaskBoard::default();
    for task in tasks {
        let column = match task.data.state {
            TaskState::Pending => &mut board.pending,
            TaskState::InProgress => &mut board.in_progress,
            TaskState::Completed => &mut board.completed,
        };
        column.push(task.clone());
    }
    board
}

pub fn dashboard_summary(contracts: &[Record<Contract>], tasks: &[Record<Task>]) -> DashboardSummary {
    DashboardSummary {
        credit_volume: credit_volume(contracts),
        closed_insurance: closed_insurance_count(contracts),
        insurance_volume: insurance_volume(contracts),
        pending_tasks: pending_count(tasks),
        resolution_rate: resolution_rate(tasks),
        monthly: monthly_volume(contracts),
        volume_by_lender: volume_by_lender(contracts),
        next_tasks: next_pending_tasks(tasks, NEXT_TASKS),
    }
}

// =========================================================================
//  RELATÓRIOS
// =========================================================================

fn selected(filter_value: &str) -> Option<&str> {
    let value = filter_value.trim();
    (!value.is_empty() && value != ALL).then_some(value)
}

/// Um contrato passa se cumprir todos os filtros ativos (E lógico).
/// Com um limite de datas ativo, contratos sem data legível ficam de fora.
/// Um limite que não é uma data é ignorado.
pub fn contract_matches(contract: &Contract, filter: &ReportFilter) -> bool {
    let start = filter.start_date.as_deref().and_then(parse_date);
    let end = filter.end_date.as_deref().and_then(parse_date);
    if start.is_some() || end.is_some() {
        let Some(date) = contract.date() else {
            return false;
        };
        if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
            return false;
        }
    }

    let text_eq = |wanted: &str, actual: Option<&str>| selected(wanted).is_none_or(|w| actual == Some(w));

    text_eq(&filter.comercial, contract.sales_rep.as_deref())
        && text_eq(&filter.tipo_servico, contract.service_type.map(ServiceType::as_str))
        && text_eq(&filter.estado, Some(contract.state.as_str()))
        && text_eq(&filter.fornecedor, contract.supplier.as_deref())
        && text_eq(&filter.financeira, contract.lender.as_deref())
}

pub fn filter_contracts(contracts: &[Record<Contract>], filter: &ReportFilter) -> Vec<Record<Contract>> {
    contracts
        .iter()
        .filter(|r| contract_matches(&r.data, filter))
        .cloned()
        .collect()
}

/// Subtotal = Σ comissões (valor financiado × % / 100); IVA a 23%; total = subtotal + IVA.
pub fn report_totals(contracts: &[Record<Contract>]) -> ReportTotals {
    let subtotal = total(contracts.iter().map(|r| r.data.commission_due())).round_dp(2);
    let tax = subtotal.saturating_mul(VAT_RATE).round_dp(2);
    ReportTotals {
        subtotal,
        tax,
        total: subtotal.saturating_add(tax),
    }
}

/// Nomes distintos (ordenados) de um campo dos contratos, para os selects do ecrã.
pub fn distinct_names<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut unique: Vec<String> = names
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    unique.sort();
    unique.dedup();
    unique
}

// =========================================================================
//  FINANCEIRO
// =========================================================================

fn same_month(date: Option<NaiveDate>, today: NaiveDate) -> bool {
    date.is_some_and(|d| d.year() == today.year() && d.month() == today.month())
}

fn with_vat(amount: Decimal) -> Decimal {
    amount.saturating_mul(Decimal::ONE + VAT_RATE).round_dp(2)
}

/// Resumo do mês de `today`: comissões a receber e a pagar, despesas (também com IVA),
/// saldo total das contas e despesas do mês por categoria.
pub fn financial_summary(
    contracts: &[Record<Contract>],
    expenses: &[Record<Expense>],
    accounts: &[Record<BankAccount>],
    today: NaiveDate,
) -> FinancialSummary {
    let this_month: Vec<&Contract> = contracts
        .iter()
        .map(|r| &r.data)
        .filter(|c| same_month(c.date(), today))
        .collect();
    let month_expenses: Vec<&Expense> = expenses
        .iter()
        .map(|r| &r.data)
        .filter(|e| same_month(e.date(), today))
        .collect();

    let receivable = total(this_month.iter().map(|c| c.commission_received.unwrap_or_default()));
    let payable = total(this_month.iter().map(|c| c.commission_due()));
    let spent = total(month_expenses.iter().map(|e| e.amount));

    FinancialSummary {
        year: today.year(),
        month: today.month(),
        commissions_receivable: receivable,
        commissions_receivable_with_vat: with_vat(receivable),
        commissions_payable: payable,
        commissions_payable_with_vat: with_vat(payable),
        expenses: spent,
        expenses_with_vat: with_vat(spent),
        total_balance: total(accounts.iter().map(|a| a.data.balance)),
        expenses_by_category: grouped_totals(
            month_expenses.iter().copied(),
            |e| e.category.as_deref(),
            |e| Some(e.amount),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{finance::Expense, tasks::Priority};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn contract(id: &str, service: Option<ServiceType>, date: &str, amount: &str) -> Record<Contract> {
        Record {
            id: id.to_string(),
            data: Contract {
                service_type: service,
                contract_date: Some(date.to_string()),
                financed_amount: amount.parse().ok(),
                premium: amount.parse().ok(),
                ..Default::default()
            },
        }
    }

    fn task(id: &str, state: TaskState) -> Record<Task> {
        Record {
            id: id.to_string(),
            data: Task {
                title: format!("Tarefa {}", id),
                state,
                priority: Priority::Medium,
                ..Default::default()
            },
        }
    }

    #[test]
    fn monthly_credit_sum_matches_parseable_credit_contracts() {
        let contracts = vec![
            contract("a", Some(ServiceType::Credit), "2024-01-10", "1000"),
            contract("b", Some(ServiceType::Credit), "2023-01-31", "500.5"),
            contract("c", Some(ServiceType::Credit), "2024-07-01", "250"),
            contract("d", Some(ServiceType::Credit), "sem data", "9999"),
            contract("e", Some(ServiceType::Insurance), "2024-07-02", "80"),
            contract("f", Some(ServiceType::Credit), "", "1"),
        ];

        let buckets = monthly_volume(&contracts);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].month, "Jan");
        assert_eq!(buckets[0].credit, d("1500.5"));
        assert_eq!(buckets[6].credit, d("250"));
        assert_eq!(buckets[6].insurance, d("80"));

        let bucketed: Decimal = buckets.iter().map(|b| b.credit).sum();
        let expected: Decimal = contracts
            .iter()
            .filter(|r| r.data.is(ServiceType::Credit) && r.data.date().is_some())
            .map(|r| r.data.financed_amount.unwrap_or_default())
            .sum();
        assert_eq!(bucketed, expected);
    }

    #[test]
    fn resolution_rate_handles_empty_and_partial_sets() {
        assert_eq!(resolution_rate(&[]), Decimal::ZERO);

        let tasks = vec![
            task("1", TaskState::Completed),
            task("2", TaskState::Completed),
            task("3", TaskState::Completed),
            task("4", TaskState::Pending),
        ];
        assert_eq!(resolution_rate(&tasks), Decimal::from(75));
    }

    #[test]
    fn grouped_totals_skip_empty_keys_and_count_missing_amounts_as_zero() {
        let mut contracts = vec![
            contract("a", Some(ServiceType::Credit), "2024-01-01", "100"),
            contract("b", Some(ServiceType::Credit), "2024-01-01", ""),
            contract("c", Some(ServiceType::Insurance), "2024-01-01", "70"),
        ];
        contracts[0].data.lender = Some("Banco B".into());
        contracts[1].data.lender = Some("Banco A".into());
        contracts[2].data.lender = Some("Banco B".into());

        let totals = volume_by_lender(&contracts);
        let keys: Vec<_> = totals.keys().cloned().collect();
        assert_eq!(keys, vec!["Banco A", "Banco B"]);
        assert_eq!(totals["Banco A"], Decimal::ZERO);
        assert_eq!(totals["Banco B"], d("100"));
    }

    #[test]
    fn report_filters_compose_in_any_order() {
        let mut contracts = vec![
            contract("a", Some(ServiceType::Insurance), "2024-01-01", "10"),
            contract("b", Some(ServiceType::Insurance), "2024-01-01", "10"),
            contract("c", Some(ServiceType::Credit), "2024-01-01", "10"),
        ];
        contracts[0].data.state = ContractState::Completed;
        contracts[2].data.state = ContractState::Completed;

        let both = ReportFilter {
            estado: "Concluído".into(),
            tipo_servico: "Seguro".into(),
            ..Default::default()
        };
        let by_state = ReportFilter {
            estado: "Concluído".into(),
            ..Default::default()
        };
        let by_type = ReportFilter {
            tipo_servico: "Seguro".into(),
            ..Default::default()
        };

        let direct = filter_contracts(&contracts, &both);
        let state_then_type = filter_contracts(&filter_contracts(&contracts, &by_state), &by_type);
        let type_then_state = filter_contracts(&filter_contracts(&contracts, &by_type), &by_state);

        let ids = |rs: &[Record<Contract>]| rs.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&direct), vec!["a"]);
        assert_eq!(ids(&state_then_type), ids(&direct));
        assert_eq!(ids(&type_then_state), ids(&direct));
    }

    #[test]
    fn date_range_is_inclusive_and_drops_undated_contracts() {
        let contracts = vec![
            contract("a", None, "2024-03-01", "0"),
            contract("b", None, "2024-03-31", "0"),
            contract("c", None, "2024-04-01", "0"),
            contract("d", None, "lixo", "0"),
        ];
        let filter = ReportFilter {
            start_date: Some("2024-03-01".into()),
            end_date: Some("2024-03-31".into()),
            ..Default::default()
        };
        let ids: Vec<_> = filter_contracts(&contracts, &filter).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // Sem limites, o contrato sem data volta a aparecer
        assert_eq!(filter_contracts(&contracts, &ReportFilter::default()).len(), 4);
    }

    #[test]
    fn report_totals_apply_vat() {
        let mut contracts = vec![
            contract("a", Some(ServiceType::Credit), "2024-01-01", "10000"),
            contract("b", Some(ServiceType::Credit), "2024-01-01", "5000"),
        ];
        contracts[0].data.commission_percentage = Some(d("2"));
        contracts[1].data.commission_percentage = Some(d("1"));

        let totals = report_totals(&contracts);
        assert_eq!(totals.subtotal, d("250"));
        assert_eq!(totals.tax, d("57.5"));
        assert_eq!(totals.total, d("307.5"));
    }

    #[test]
    fn financial_summary_only_counts_the_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let mut contracts = vec![
            contract("a", Some(ServiceType::Credit), "2024-05-02", "1000"),
            contract("b", Some(ServiceType::Credit), "2023-05-02", "1000"),
        ];
        for c in &mut contracts {
            c.data.commission_percentage = Some(d("10"));
            c.data.commission_received = Some(d("100"));
        }
        let expenses = vec![
            Record {
                id: "e1".into(),
                data: Expense {
                    description: "Papel".into(),
                    category: Some("Escritório".into()),
                    amount: d("20"),
                    date: Some("2024-05-03".into()),
                    account_id: "c1".into(),
                },
            },
            Record {
                id: "e2".into(),
                data: Expense {
                    description: "Antiga".into(),
                    category: Some("Escritório".into()),
                    amount: d("999"),
                    date: Some("2024-04-03".into()),
                    account_id: "c1".into(),
                },
            },
        ];
        let accounts = vec![Record {
            id: "c1".into(),
            data: BankAccount {
                bank_name: "CGD".into(),
                iban: None,
                balance: d("1000"),
            },
        }];

        let summary = financial_summary(&contracts, &expenses, &accounts, today);
        assert_eq!(summary.commissions_receivable, d("100"));
        assert_eq!(summary.commissions_receivable_with_vat, d("123"));
        assert_eq!(summary.commissions_payable, d("100"));
        assert_eq!(summary.expenses, d("20"));
        assert_eq!(summary.expenses_with_vat, d("24.6"));
        assert_eq!(summary.total_balance, d("1000"));
        assert_eq!(summary.expenses_by_category["Escritório"], d("20"));
    }

    #[test]
    fn identical_snapshots_give_identical_output() {
        let contracts = vec![
            contract("a", Some(ServiceType::Credit), "2024-01-10", "1000"),
            contract("b", Some(ServiceType::Insurance), "2024-02-10", "50"),
        ];
        let tasks = vec![task("1", TaskState::Pending), task("2", TaskState::Completed)];

        let first = serde_json::to_string(&dashboard_summary(&contracts, &tasks)).unwrap();
        let second = serde_json::to_string(&dashboard_summary(&contracts.clone(), &tasks.clone())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let mut big = contract("a", Some(ServiceType::Credit), "2024-01-10", "0");
        big.data.financed_amount = Some(Decimal::MAX);
        let contracts = vec![big.clone(), Record { id: "b".into(), ..big }];

        assert_eq!(credit_volume(&contracts), Decimal::MAX);
        assert_eq!(monthly_volume(&contracts)[0].credit, Decimal::MAX);

        let mut huge_rate = contract("c", Some(ServiceType::Credit), "2024-01-10", "0");
        huge_rate.data.financed_amount = Some(d("100000000000000000000"));
        huge_rate.data.commission_percentage = Some(d("10000000000"));
        let totals = report_totals(&[huge_rate.clone()]);
        assert_eq!(totals.subtotal, (Decimal::MAX / Decimal::ONE_HUNDRED).round_dp(2));
        assert_eq!(totals.total, totals.subtotal + totals.tax);

        huge_rate.data.commission_received = Some(Decimal::MAX);
        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let summary = financial_summary(&[huge_rate.clone(), huge_rate], &[], &[], today);
        assert_eq!(summary.commissions_receivable, Decimal::MAX);
        assert_eq!(summary.commissions_receivable_with_vat, Decimal::MAX);
    }

    #[test]
    fn board_groups_tasks_by_state() {
        let tasks = vec![
            task("1", TaskState::Pending),
            task("2", TaskState::InProgress),
            task("3", TaskState::Completed),
            task("4", TaskState::Pending),
        ];
        let board = task_board(&tasks);
        assert_eq!(board.pending.len(), 2);
        assert_eq!(board.in_progress.len(), 1);
        assert_eq!(board.completed.len(), 1);
        assert_eq!(next_pending_tasks(&tasks, NEXT_TASKS).len(), 2);
    }
}
