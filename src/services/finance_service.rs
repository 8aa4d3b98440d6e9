// src/services/finance_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{paths::Scope, FinanceRepository},
    models::{
        finance::{BankAccount, Expense},
        record::Record,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    /// Regista a despesa e desconta-a do saldo da conta: as duas coisas ou nenhuma.
    pub async fn create_expense(&self, scope: &Scope, expense: Expense) -> Result<String, AppError> {
        expense.validate()?;

        if self.repo.find_account(scope, &expense.account_id).await?.is_none() {
            return Err(AppError::invalid("A conta bancária selecionada não existe."));
        }

        let id = self.repo.insert_expense_and_debit(scope, &expense).await?;
        tracing::info!(
            "Despesa {} de {} debitada na conta {}",
            id,
            expense.amount,
            expense.account_id
        );
        Ok(id)
    }

    pub async fn list_expenses(&self, scope: &Scope) -> Result<Vec<Record<Expense>>, AppError> {
        self.repo.list_expenses(scope).await
    }

    pub async fn create_account(&self, scope: &Scope, account: BankAccount) -> Result<String, AppError> {
        account.validate()?;
        let id = self.repo.insert_account(scope, &account).await?;
        tracing::info!("Conta bancária {} ({}) criada", id, account.bank_name);
        Ok(id)
    }

    pub async fn list_accounts(&self, scope: &Scope) -> Result<Vec<Record<BankAccount>>, AppError> {
        self.repo.list_accounts(scope).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{memory_store::MemoryStore, store::DocumentStore};

    fn fixture() -> (FinanceService, FinanceRepository, Scope) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let repo = FinanceRepository::new(store);
        (FinanceService::new(repo.clone()), repo, Scope::new("gestao", "u1"))
    }

    fn expense(account_id: &str, amount: i64) -> Expense {
        Expense {
            description: "Renda".into(),
            amount: Decimal::from(amount),
            account_id: account_id.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn expense_debits_the_account() {
        let (service, repo, scope) = fixture();
        let account = BankAccount {
            bank_name: "CGD".into(),
            balance: Decimal::from(1000),
            ..Default::default()
        };
        let account_id = service.create_account(&scope, account).await.unwrap();

        service.create_expense(&scope, expense(&account_id, 250)).await.unwrap();

        let account = repo.find_account(&scope, &account_id).await.unwrap().unwrap();
        assert_eq!(account.data.balance, Decimal::from(750));
        assert_eq!(service.list_expenses(&scope).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_account_leaves_nothing_behind() {
        let (service, repo, scope) = fixture();
        let err = service.create_expense(&scope, expense("nada", 10)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(repo.list_expenses(&scope).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_is_all_or_nothing_even_without_the_check() {
        let (_service, repo, scope) = fixture();
        // O incremento falha (conta inexistente), por isso a despesa também não fica
        assert!(repo.insert_expense_and_debit(&scope, &expense("nada", 10)).await.is_err());
        assert!(repo.list_expenses(&scope).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let (service, _repo, scope) = fixture();
        let err = service.create_expense(&scope, expense("c1", 0)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
