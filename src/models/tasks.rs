// src/models/tasks.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    #[serde(rename = "Baixa")]
    Low,
    #[default]
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Alta")]
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TaskState {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Em Andamento")]
    InProgress,
    #[serde(rename = "Concluído")]
    Completed,
}

/// Marca das tarefas criadas automaticamente a partir de um contrato.
pub const ORIGIN_MISSING_DOCUMENTS: &str = "documentosEmFalta";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Task {
    #[serde(rename = "titulo", default, deserialize_with = "lenient::or_default")]
    #[validate(length(min = 1, message = "O título da tarefa é obrigatório."))]
    pub title: String,

    #[serde(rename = "descricao", default, deserialize_with = "lenient::string")]
    pub description: Option<String>,

    // YYYY-MM-DD
    #[serde(rename = "prazo", default, deserialize_with = "lenient::string")]
    #[schema(example = "2024-03-22")]
    pub due_date: Option<String>,

    #[serde(rename = "prioridade", default, deserialize_with = "lenient::or_default")]
    pub priority: Priority,

    #[serde(rename = "estado", default, deserialize_with = "lenient::or_default")]
    pub state: TaskState,

    // Nome do membro da equipa
    #[serde(rename = "responsavel", default, deserialize_with = "lenient::string")]
    pub assignee: Option<String>,

    #[serde(rename = "clienteId", default, deserialize_with = "lenient::string")]
    pub client_id: Option<String>,

    #[serde(rename = "contratoId", default, deserialize_with = "lenient::string")]
    pub contract_id: Option<String>,

    #[serde(
        rename = "origem",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.state == TaskState::Completed
    }

    /// Tarefa gerada por um contrato com documentos em falta.
    pub fn is_missing_documents_task(&self) -> bool {
        self.origin.as_deref() == Some(ORIGIN_MISSING_DOCUMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names_follow_the_documents() {
        let task = Task {
            title: "Ligar".into(),
            priority: Priority::High,
            state: TaskState::InProgress,
            ..Default::default()
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["prioridade"], json!("Alta"));
        assert_eq!(value["estado"], json!("Em Andamento"));
        assert!(value.get("origem").is_none());
    }

    #[test]
    fn unknown_state_falls_back_to_pending() {
        let task: Task = serde_json::from_value(json!({ "titulo": "x", "estado": "?" })).unwrap();
        assert_eq!(task.state, TaskState::Pending);
        assert!(!task.is_completed());
    }
}
