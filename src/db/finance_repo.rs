// src/db/finance_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        paths::{Collection, Scope},
        records::{get_record, get_records},
        store::{new_document_id, to_fields, DocumentStore, Query, WriteBatch},
    },
    models::{
        finance::{BankAccount, Expense},
        record::Record,
    },
};

#[derive(Clone)]
pub struct FinanceRepository {
    store: Arc<dyn DocumentStore>,
}

impl FinanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    pub fn accounts_query(&self, scope: &Scope) -> Query {
        Query::all(scope.collection(Collection::BankAccounts))
    }

    pub async fn list_accounts(&self, scope: &Scope) -> Result<Vec<Record<BankAccount>>, AppError> {
        get_records(self.store.as_ref(), &self.accounts_query(scope)).await
    }

    pub async fn find_account(
        &self,
        scope: &Scope,
        id: &str,
    ) -> Result<Option<Record<BankAccount>>, AppError> {
        get_record(self.store.as_ref(), &scope.collection(Collection::BankAccounts), id).await
    }

    pub async fn insert_account(&self, scope: &Scope, account: &BankAccount) -> Result<String, AppError> {
        self.store
            .insert(&scope.collection(Collection::BankAccounts), to_fields(account)?)
            .await
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub fn expenses_query(&self, scope: &Scope) -> Query {
        Query::all(scope.collection(Collection::Expenses))
    }

    pub async fn list_expenses(&self, scope: &Scope) -> Result<Vec<Record<Expense>>, AppError> {
        get_records(self.store.as_ref(), &self.expenses_query(scope)).await
    }

    /// Grava a despesa e desconta o valor do saldo da conta num único lote atómico.
    /// O desconto é um incremento no próprio banco, não um "ler saldo, gravar saldo".
    pub async fn insert_expense_and_debit(
        &self,
        scope: &Scope,
        expense: &Expense,
    ) -> Result<String, AppError> {
        let id = new_document_id();

        let mut batch = WriteBatch::new();
        batch
            .set(&scope.collection(Collection::Expenses), &id, to_fields(expense)?)
            .increment(
                &scope.collection(Collection::BankAccounts),
                &expense.account_id,
                "saldo",
                -expense.amount,
            );

        self.store.commit(batch).await?;
        Ok(id)
    }
}
