// src/models/finance.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive")
            .with_message("O valor tem de ser superior a zero.".into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Expense {
    #[serde(rename = "descricao", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[serde(rename = "categoria", default, deserialize_with = "lenient::string")]
    pub category: Option<String>,

    #[serde(rename = "valor", default, deserialize_with = "lenient::decimal_or_zero")]
    #[validate(custom(function = "positive_amount"))]
    #[schema(value_type = f64, example = 49.9)]
    pub amount: Decimal,

    // YYYY-MM-DD
    #[serde(rename = "data", default, deserialize_with = "lenient::string")]
    pub date: Option<String>,

    #[serde(rename = "contaId", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "Escolha a conta bancária."))]
    pub account_id: String,
}

impl Expense {
    pub fn date(&self) -> Option<chrono::NaiveDate> {
        self.date.as_deref().and_then(lenient::parse_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct BankAccount {
    #[serde(rename = "nomeBanco", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O nome do banco é obrigatório."))]
    pub bank_name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub iban: Option<String>,

    // Só muda através das despesas
    #[serde(rename = "saldo", default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 1000)]
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expense_amount_must_be_positive() {
        let expense: Expense = serde_json::from_value(json!({
            "descricao": "Papel",
            "valor": "0",
            "contaId": "c1"
        }))
        .unwrap();
        let errors = expense.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn text_balances_are_read_as_numbers() {
        let account: BankAccount =
            serde_json::from_value(json!({ "nomeBanco": "CGD", "saldo": "1500,50" })).unwrap();
        assert_eq!(account.balance, Decimal::new(150050, 2));
    }
}
