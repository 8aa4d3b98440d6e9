// src/models/partners.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;
use crate::models::crm::NIF_RE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PartnerKind {
    #[serde(rename = "Fornecedor")]
    Supplier,
    #[serde(rename = "Financeira")]
    Lender,
    #[serde(rename = "Seguradora")]
    Insurer,
}

impl PartnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartnerKind::Supplier => "Fornecedor",
            PartnerKind::Lender => "Financeira",
            PartnerKind::Insurer => "Seguradora",
        }
    }
}

// --- PARCEIROS (partilhados entre sessões) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Partner {
    // Definido pelo servidor na criação, a partir da secção
    #[serde(rename = "tipo", default, deserialize_with = "lenient::enumeration")]
    pub kind: Option<PartnerKind>,

    // Os contratos referenciam o parceiro por este nome
    #[serde(rename = "nome", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O nome do parceiro é obrigatório."))]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(regex(path = *NIF_RE, message = "O NIF deve ter 9 dígitos."))]
    pub nif: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub iban: Option<String>,

    #[serde(rename = "morada", default, deserialize_with = "lenient::string")]
    pub address: Option<String>,

    #[serde(rename = "codigoPostal", default, deserialize_with = "lenient::string")]
    pub postal_code: Option<String>,

    #[serde(rename = "localidade", default, deserialize_with = "lenient::string")]
    pub locality: Option<String>,

    #[serde(rename = "telefone", default, deserialize_with = "lenient::string")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    // Fornecedor
    #[serde(default, deserialize_with = "lenient::string")]
    pub cae: Option<String>,

    #[serde(rename = "capitalSocial", default, deserialize_with = "lenient::string")]
    pub share_capital: Option<String>,

    #[serde(rename = "pessoaContacto", default, deserialize_with = "lenient::string")]
    pub contact_person: Option<String>,

    // "AUTO" / "Não AUTO"
    #[serde(rename = "equipamento", default, deserialize_with = "lenient::string")]
    pub equipment: Option<String>,

    // Financeira e Seguradora
    #[serde(rename = "nomeComercial", default, deserialize_with = "lenient::string")]
    pub agent_name: Option<String>,

    #[serde(rename = "dataNascimentoComercial", default, deserialize_with = "lenient::string")]
    pub agent_birth_date: Option<String>,

    #[serde(rename = "contactoComercial", default, deserialize_with = "lenient::string")]
    pub agent_phone: Option<String>,

    #[serde(rename = "emailComercial", default, deserialize_with = "lenient::string")]
    pub agent_email: Option<String>,

    #[serde(rename = "emailComissoes", default, deserialize_with = "lenient::string")]
    pub commissions_email: Option<String>,
}

// --- EQUIPA ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MemberState {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
}

impl MemberState {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberState::Active => "Ativo",
            MemberState::Inactive => "Inativo",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MemberState::Active => MemberState::Inactive,
            MemberState::Inactive => MemberState::Active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TeamMember {
    #[serde(rename = "primeiroNome", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: String,

    #[serde(rename = "ultimoNome", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O último nome é obrigatório."))]
    pub last_name: String,

    // Derivado de primeiro + último nome; é por este nome que contratos e tarefas o referem
    #[serde(rename = "nome", default, deserialize_with = "lenient::or_default")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[serde(rename = "telefone", default, deserialize_with = "lenient::string")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub nif: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub iban: Option<String>,

    #[serde(rename = "dataInicio", default, deserialize_with = "lenient::string")]
    pub start_date: Option<String>,

    #[serde(rename = "estado", default, deserialize_with = "lenient::or_default")]
    pub state: MemberState,
}

impl TeamMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}
