// src/models/crm.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;

// NIF português: exatamente 9 dígitos
pub static NIF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9}$").expect("expressão regular do NIF inválida"));

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ClientKind {
    Particular,
    Empresa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum InteractionKind {
    #[serde(rename = "Nota Manual")]
    ManualNote,
    #[serde(rename = "Tarefa Criada")]
    TaskCreated,
    #[serde(rename = "Tarefa Concluída")]
    TaskCompleted,
}

// --- CLIENTE ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Client {
    #[serde(rename = "nome", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Ana Silva")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(regex(path = *NIF_RE, message = "O NIF deve ter 9 dígitos."))]
    #[schema(example = "123456789")]
    pub nif: Option<String>,

    #[serde(rename = "dataNascimento", default, deserialize_with = "lenient::string")]
    pub birth_date: Option<String>,

    #[serde(rename = "telefone", default, deserialize_with = "lenient::string")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[serde(rename = "morada", default, deserialize_with = "lenient::string")]
    pub address: Option<String>,

    #[serde(rename = "codigoPostal", default, deserialize_with = "lenient::string")]
    pub postal_code: Option<String>,

    #[serde(rename = "localidade", default, deserialize_with = "lenient::string")]
    pub locality: Option<String>,

    #[serde(rename = "tipoCliente", default, deserialize_with = "lenient::enumeration")]
    pub kind: Option<ClientKind>,

    #[serde(rename = "dataCriacao", default, deserialize_with = "lenient::string")]
    pub created_on: Option<String>,

    #[serde(rename = "observacoes", default, deserialize_with = "lenient::string")]
    pub notes: Option<String>,

    // Nome (não id) do membro da equipa
    #[serde(rename = "comercialResponsavel", default, deserialize_with = "lenient::string")]
    pub account_manager: Option<String>,

    #[serde(
        rename = "rgpdAssinado",
        default,
        deserialize_with = "lenient::flag",
        serialize_with = "lenient::yes_no"
    )]
    #[schema(value_type = String, example = "Sim")]
    pub gdpr_signed: bool,
}

impl Client {
    /// NIF normalizado para a verificação de unicidade (sem espaços; vazio não conta).
    pub fn nif_key(&self) -> Option<&str> {
        self.nif.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Pesquisa livre da lista de clientes: nome ou NIF, sem distinguir maiúsculas.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.nif.as_deref().is_some_and(|nif| nif.contains(&term))
    }
}

// --- SUB-COLEÇÕES ---

/// Entrada do histórico de um cliente ou contrato. Só se acrescenta, nunca se edita.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Interaction {
    // Timestamp ISO 8601
    #[serde(rename = "data", default, deserialize_with = "lenient::or_default")]
    pub occurred_at: String,

    #[serde(rename = "tipo", default, deserialize_with = "lenient::enumeration")]
    pub kind: Option<InteractionKind>,

    #[serde(rename = "descricao", default, deserialize_with = "lenient::or_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttachedDocument {
    #[serde(rename = "nome", default, deserialize_with = "lenient::or_default")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub url: String,

    #[serde(rename = "dataUpload", default, deserialize_with = "lenient::or_default")]
    pub uploaded_at: String,
}

// Payload da nota manual
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NotePayload {
    #[serde(rename = "descricao")]
    #[validate(length(min = 1, message = "A nota não pode estar vazia."))]
    pub description: String,
}
