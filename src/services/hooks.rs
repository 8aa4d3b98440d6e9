// src/services/hooks.rs
//
// Efeitos secundários que correm depois de uma escrita confirmada.
// Cada hook regista e devolve a sua própria falha; nada é desfeito.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Local, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::{paths::RecordOwner, paths::Scope, CrmRepository, TasksRepository},
    models::{
        contracts::Contract,
        crm::{Interaction, InteractionKind},
        tasks::{Priority, Task, TaskState, ORIGIN_MISSING_DOCUMENTS},
    },
};

/// Prazo das tarefas automáticas, em dias a contar de hoje.
pub const MISSING_DOCUMENTS_DUE_DAYS: i64 = 7;

/// Resposta de uma gravação: id do registo e avisos dos efeitos secundários que falharam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SaveOutcome {
    pub id: String,
    #[serde(rename = "avisos")]
    pub warnings: Vec<String>,
}

impl SaveOutcome {
    pub fn new(id: impl Into<String>, warnings: Vec<String>) -> Self {
        Self { id: id.into(), warnings }
    }
}

pub struct ContractSaved {
    pub id: String,
    pub contract: Contract,
}

pub enum TaskEvent {
    Created { id: String, task: Task },
    Completed { id: String, task: Task },
}

impl TaskEvent {
    fn task(&self) -> &Task {
        match self {
            TaskEvent::Created { task, .. } | TaskEvent::Completed { task, .. } => task,
        }
    }

    fn task_id(&self) -> &str {
        match self {
            TaskEvent::Created { id, .. } | TaskEvent::Completed { id, .. } => id,
        }
    }
}

#[async_trait]
pub trait PostCommitHook<E>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, scope: &Scope, event: &E) -> Result<(), AppError>;
}

/// Lista ordenada de hooks. Uma falha não impede os seguintes.
pub struct HookChain<E> {
    hooks: Vec<Arc<dyn PostCommitHook<E>>>,
}

impl<E> Clone for HookChain<E> {
    fn clone(&self) -> Self {
        Self { hooks: self.hooks.clone() }
    }
}

impl<E: Sync> HookChain<E> {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn with(mut self, hook: impl PostCommitHook<E> + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Corre todos os hooks e devolve as mensagens das falhas.
    pub async fn run(&self, scope: &Scope, event: &E) -> Vec<String> {
        let mut warnings = Vec::new();
        for hook in &self.hooks {
            if let Err(e) = hook.run(scope, event).await {
                tracing::warn!("Efeito secundário '{}' falhou: {}", hook.name(), e);
                warnings.push(format!("{}: {}", hook.name(), e));
            }
        }
        warnings
    }
}

impl<E: Sync> Default for HookChain<E> {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
//  CONTRATO -> TAREFA
// =========================================================================

/// Contrato com documentos em falta gera uma tarefa de prioridade alta para o comercial.
#[derive(Clone)]
pub struct MissingDocumentsTaskHook {
    tasks: TasksRepository,
}

impl MissingDocumentsTaskHook {
    pub fn new(tasks: TasksRepository) -> Self {
        Self { tasks }
    }
}

pub fn missing_documents_task(contract_id: &str, contract: &Contract) -> Task {
    let due = Local::now().date_naive() + Duration::days(MISSING_DOCUMENTS_DUE_DAYS);
    Task {
        title: format!("Documentação pendente para o contrato de {}", contract.client_name),
        description: Some(
            contract
                .missing_documents_note
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "Verificar documentos em falta no contrato.".to_string()),
        ),
        due_date: Some(due.format("%Y-%m-%d").to_string()),
        priority: Priority::High,
        state: TaskState::Pending,
        assignee: contract.sales_rep.clone(),
        client_id: Some(contract.client_id.clone()),
        contract_id: Some(contract_id.to_string()),
        origin: Some(ORIGIN_MISSING_DOCUMENTS.to_string()),
    }
}

#[async_trait]
impl PostCommitHook<ContractSaved> for MissingDocumentsTaskHook {
    fn name(&self) -> &'static str {
        "tarefa de documentos em falta"
    }

    async fn run(&self, scope: &Scope, event: &ContractSaved) -> Result<(), AppError> {
        if !event.contract.missing_documents {
            return Ok(());
        }

        // Uma tarefa aberta por contrato chega; voltar a gravar o contrato não duplica.
        let existing = self.tasks.missing_documents_tasks(scope, &event.id).await?;
        if existing.iter().any(|t| !t.data.is_completed()) {
            tracing::info!("Contrato {} já tem tarefa de documentos em aberto", event.id);
            return Ok(());
        }

        let task = missing_documents_task(&event.id, &event.contract);
        let task_id = self.tasks.insert(scope, &task).await?;
        tracing::info!("Tarefa {} criada para o contrato {}", task_id, event.id);
        Ok(())
    }
}

// =========================================================================
//  TAREFA -> HISTÓRICO DO CLIENTE
// =========================================================================

#[derive(Clone)]
pub struct TaskInteractionHook {
    crm: CrmRepository,
}

impl TaskInteractionHook {
    pub fn new(crm: CrmRepository) -> Self {
        Self { crm }
    }
}

pub fn task_interaction(event: &TaskEvent) -> Interaction {
    let (kind, description) = match event {
        TaskEvent::Created { task, .. } => (
            InteractionKind::TaskCreated,
            format!(
                "Nova tarefa: \"{}\" atribuída a {}.",
                task.title,
                task.assignee.as_deref().unwrap_or("ninguém")
            ),
        ),
        TaskEvent::Completed { task, .. } => (
            InteractionKind::TaskCompleted,
            format!("A tarefa \"{}\" foi concluída.", task.title),
        ),
    };
    Interaction {
        occurred_at: Utc::now().to_rfc3339(),
        kind: Some(kind),
        description,
    }
}

#[async_trait]
impl PostCommitHook<TaskEvent> for TaskInteractionHook {
    fn name(&self) -> &'static str {
        "histórico do cliente"
    }

    async fn run(&self, scope: &Scope, event: &TaskEvent) -> Result<(), AppError> {
        let Some(client_id) = event
            .task()
            .client_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
        else {
            return Ok(());
        };

        let owner = RecordOwner::Client(client_id.to_string());
        self.crm
            .append_interaction(scope, &owner, &task_interaction(event))
            .await?;
        tracing::info!("Histórico do cliente {} atualizado pela tarefa {}", client_id, event.task_id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_store::MemoryStore, store::DocumentStore};

    struct Failing;

    #[async_trait]
    impl PostCommitHook<ContractSaved> for Failing {
        fn name(&self) -> &'static str {
            "falha"
        }

        async fn run(&self, _scope: &Scope, _event: &ContractSaved) -> Result<(), AppError> {
            Err(AppError::BackendUnavailable("sem ligação".into()))
        }
    }

    fn contract_with_missing_docs() -> Contract {
        Contract {
            client_id: "cli1".into(),
            client_name: "Ana".into(),
            sales_rep: Some("Rui".into()),
            missing_documents: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn a_failing_hook_does_not_stop_the_next_one() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let tasks = TasksRepository::new(store);
        let chain = HookChain::new()
            .with(Failing)
            .with(MissingDocumentsTaskHook::new(tasks.clone()));
        let scope = Scope::new("gestao", "u1");
        let event = ContractSaved { id: "k1".into(), contract: contract_with_missing_docs() };

        let warnings = chain.run(&scope, &event).await;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("falha"));
        assert_eq!(tasks.missing_documents_tasks(&scope, "k1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn saving_twice_keeps_a_single_open_task() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let tasks = TasksRepository::new(store);
        let hook = MissingDocumentsTaskHook::new(tasks.clone());
        let scope = Scope::new("gestao", "u1");
        let event = ContractSaved { id: "k1".into(), contract: contract_with_missing_docs() };

        hook.run(&scope, &event).await.unwrap();
        hook.run(&scope, &event).await.unwrap();
        assert_eq!(tasks.missing_documents_tasks(&scope, "k1").await.unwrap().len(), 1);
    }

    #[test]
    fn automatic_task_carries_the_contract_details() {
        let task = missing_documents_task("k1", &contract_with_missing_docs());
        let due = Local::now().date_naive() + Duration::days(7);
        assert_eq!(task.title, "Documentação pendente para o contrato de Ana");
        assert_eq!(task.description.as_deref(), Some("Verificar documentos em falta no contrato."));
        assert_eq!(task.due_date, Some(due.format("%Y-%m-%d").to_string()));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.assignee.as_deref(), Some("Rui"));
        assert_eq!(task.contract_id.as_deref(), Some("k1"));
    }

    #[test]
    fn interaction_text_depends_on_the_event() {
        let task = Task {
            title: "Ligar".into(),
            assignee: Some("Rui".into()),
            ..Default::default()
        };
        let created = task_interaction(&TaskEvent::Created { id: "t".into(), task: task.clone() });
        assert_eq!(created.description, "Nova tarefa: \"Ligar\" atribuída a Rui.");
        assert_eq!(created.kind, Some(InteractionKind::TaskCreated));

        let done = task_interaction(&TaskEvent::Completed { id: "t".into(), task });
        assert_eq!(done.description, "A tarefa \"Ligar\" foi concluída.");
    }
}
