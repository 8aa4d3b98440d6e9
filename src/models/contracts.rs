// src/models/contracts.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

/// Teto dos montantes de um contrato: mil milhões de euros.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn bounded_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value > MAX_AMOUNT {
        return Err(ValidationError::new("range")
            .with_message("O valor tem de estar entre 0 e 1 000 000 000 €.".into()));
    }
    Ok(())
}

fn bounded_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("range")
            .with_message("A percentagem tem de estar entre 0 e 100.".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ServiceType {
    #[serde(rename = "Crédito")]
    Credit,
    #[serde(rename = "Seguro")]
    Insurance,
    #[serde(rename = "Legalização Automóvel")]
    VehicleLegalization,
    #[serde(rename = "Consultoria Financeira")]
    FinancialConsulting,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Credit => "Crédito",
            ServiceType::Insurance => "Seguro",
            ServiceType::VehicleLegalization => "Legalização Automóvel",
            ServiceType::FinancialConsulting => "Consultoria Financeira",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ContractState {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Concluído")]
    Completed,
}

impl ContractState {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractState::Pending => "Pendente",
            ContractState::Active => "Ativo",
            ContractState::Completed => "Concluído",
        }
    }
}

/// Checklist de documentos de um crédito, por omissão tudo por entregar.
pub fn default_checklist() -> BTreeMap<String, bool> {
    [
        "Livrança",
        "Contrato",
        "DUA",
        "DAV",
        "MUA de compra",
        "MUA de venda",
        "Extinção de reserva",
    ]
    .into_iter()
    .map(|item| (item.to_string(), false))
    .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Contract {
    // --- Campos comuns ---
    #[serde(rename = "clienteId", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O contrato tem de ter um cliente."))]
    pub client_id: String,

    // Desnormalizado: copiado do cliente no momento da gravação, nunca ressincronizado
    #[serde(rename = "clienteNome", default, deserialize_with = "lenient::or_default")]
    pub client_name: String,

    #[serde(rename = "dataContrato", default, deserialize_with = "lenient::string")]
    #[schema(example = "2024-03-15")]
    pub contract_date: Option<String>,

    // Nome do comercial (membro da equipa)
    #[serde(rename = "comercial", default, deserialize_with = "lenient::string")]
    pub sales_rep: Option<String>,

    #[serde(rename = "tipoServico", default, deserialize_with = "lenient::enumeration")]
    pub service_type: Option<ServiceType>,

    #[serde(rename = "estado", default, deserialize_with = "lenient::or_default")]
    pub state: ContractState,

    // --- Crédito ---
    #[serde(rename = "fornecedor", default, deserialize_with = "lenient::string")]
    pub supplier: Option<String>,

    #[serde(rename = "financeira", default, deserialize_with = "lenient::string")]
    pub lender: Option<String>,

    #[serde(rename = "valorFinanciado", default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "bounded_amount"))]
    #[schema(value_type = Option<f64>, example = 15000)]
    pub financed_amount: Option<Decimal>,

    #[serde(rename = "comissaoPercentagem", default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "bounded_percentage"))]
    #[schema(value_type = Option<f64>, example = 2.5)]
    pub commission_percentage: Option<Decimal>,

    #[serde(rename = "comissaoRecebida", default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "bounded_amount"))]
    #[schema(value_type = Option<f64>)]
    pub commission_received: Option<Decimal>,

    #[serde(rename = "matricula", default, deserialize_with = "lenient::string")]
    pub plate: Option<String>,

    #[serde(rename = "tipoCredito", default, deserialize_with = "lenient::string")]
    pub credit_kind: Option<String>,

    #[serde(rename = "dataEntregaFornecedor", default, deserialize_with = "lenient::string")]
    pub supplier_delivery_date: Option<String>,

    #[serde(rename = "dataEntregaFinanceira", default, deserialize_with = "lenient::string")]
    pub lender_delivery_date: Option<String>,

    #[serde(default = "default_checklist", deserialize_with = "lenient::or_default")]
    pub checklist: BTreeMap<String, bool>,

    #[serde(rename = "creditoRealizado", default, deserialize_with = "lenient::flag")]
    pub credit_done: bool,

    // --- Seguro ---
    #[serde(rename = "tipoSeguro", default, deserialize_with = "lenient::string")]
    pub insurance_kind: Option<String>,

    #[serde(rename = "seguradora", default, deserialize_with = "lenient::string")]
    pub insurer: Option<String>,

    #[serde(rename = "numeroApolice", default, deserialize_with = "lenient::string")]
    pub policy_number: Option<String>,

    #[serde(rename = "dataSubscricao", default, deserialize_with = "lenient::string")]
    pub subscription_date: Option<String>,

    // Prémio do seguro
    #[serde(rename = "valor", default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "bounded_amount"))]
    #[schema(value_type = Option<f64>)]
    pub premium: Option<Decimal>,

    #[serde(rename = "renovacaoAutomatica", default, deserialize_with = "lenient::flag")]
    pub auto_renewal: bool,

    // --- Legalização automóvel ---
    #[serde(default, deserialize_with = "lenient::string")]
    pub chassis: Option<String>,

    #[serde(rename = "matriculaEstrangeira", default, deserialize_with = "lenient::string")]
    pub foreign_plate: Option<String>,

    #[serde(rename = "paisImportacao", default, deserialize_with = "lenient::string")]
    pub import_country: Option<String>,

    #[serde(rename = "dataEstimadaConclusao", default, deserialize_with = "lenient::string")]
    pub estimated_completion: Option<String>,

    // --- Consultoria financeira ---
    #[serde(
        rename = "diagnosticoFeito",
        default,
        deserialize_with = "lenient::flag",
        serialize_with = "lenient::yes_no"
    )]
    #[schema(value_type = String, example = "Não")]
    pub diagnosis_done: bool,

    #[serde(rename = "situacaoAtual", default, deserialize_with = "lenient::string")]
    pub current_situation: Option<String>,

    #[serde(rename = "dataSessao", default, deserialize_with = "lenient::string")]
    pub session_date: Option<String>,

    #[serde(rename = "acoesImplementar", default, deserialize_with = "lenient::string")]
    pub planned_actions: Option<String>,

    // --- Documentação ---
    #[serde(rename = "documentosEmFalta", default, deserialize_with = "lenient::flag")]
    pub missing_documents: bool,

    #[serde(rename = "documentosEmFaltaDesc", default, deserialize_with = "lenient::string")]
    pub missing_documents_note: Option<String>,
}

impl Contract {
    /// Data do contrato, se existir e for legível.
    pub fn date(&self) -> Option<NaiveDate> {
        self.contract_date.as_deref().and_then(lenient::parse_date)
    }

    pub fn is(&self, service: ServiceType) -> bool {
        self.service_type == Some(service)
    }

    /// Comissão a pagar: valor financiado × percentagem / 100. Valores em falta contam zero.
    pub fn commission_due(&self) -> Decimal {
        let amount = self.financed_amount.unwrap_or_default();
        let rate = self.commission_percentage.unwrap_or_default();
        amount.saturating_mul(rate) / Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_values_are_read_leniently() {
        let contract: Contract = serde_json::from_value(json!({
            "clienteId": "c1",
            "tipoServico": "Crédito",
            "estado": "Concluído",
            "valorFinanciado": "10000",
            "comissaoPercentagem": 2.5,
            "dataContrato": "2024-03-15",
            "documentosEmFalta": "true"
        }))
        .unwrap();

        assert!(contract.is(ServiceType::Credit));
        assert_eq!(contract.state, ContractState::Completed);
        assert_eq!(contract.commission_due(), Decimal::from(250));
        assert_eq!(contract.date(), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert!(contract.missing_documents);
        assert_eq!(contract.checklist, default_checklist());
    }

    #[test]
    fn unknown_enums_and_bad_dates_degrade_to_none() {
        let contract: Contract = serde_json::from_value(json!({
            "tipoServico": "",
            "estado": "Arquivado",
            "dataContrato": "ontem",
            "checklist": "nada"
        }))
        .unwrap();

        assert_eq!(contract.service_type, None);
        assert_eq!(contract.state, ContractState::Pending);
        assert_eq!(contract.date(), None);
        assert!(contract.checklist.is_empty());
        assert_eq!(contract.commission_due(), Decimal::ZERO);
    }

    #[test]
    fn amounts_outside_the_accepted_range_are_rejected() {
        let contract: Contract = serde_json::from_value(json!({
            "clienteId": "c1",
            "valorFinanciado": "100000000000000000000",
            "comissaoPercentagem": 150,
            "valor": -5
        }))
        .unwrap();
        let errors = contract.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("financed_amount"));
        assert!(fields.contains_key("commission_percentage"));
        assert!(fields.contains_key("premium"));

        let ok: Contract = serde_json::from_value(json!({
            "clienteId": "c1",
            "valorFinanciado": 15000,
            "comissaoPercentagem": "2,5"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
    }
}
