// src/services/task_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{paths::Scope, TasksRepository},
    models::{
        record::Record,
        tasks::{Task, TaskState},
    },
    services::hooks::{HookChain, SaveOutcome, TaskEvent},
};

#[derive(Clone)]
pub struct TaskService {
    repo: TasksRepository,
    hooks: HookChain<TaskEvent>,
}

impl TaskService {
    pub fn new(repo: TasksRepository, hooks: HookChain<TaskEvent>) -> Self {
        Self { repo, hooks }
    }

    async fn find(&self, scope: &Scope, id: &str) -> Result<Record<Task>, AppError> {
        self.repo
            .find(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tarefa".into()))
    }

    /// Cria ou substitui uma tarefa. Criar, ou passar a concluída numa edição,
    /// deixa uma entrada no histórico do cliente.
    ///
    /// `origem` só é escrita pelo servidor: ignorada ao criar, preservada ao editar
    /// (juntamente com o contrato das tarefas automáticas).
    pub async fn save(&self, scope: &Scope, id: Option<&str>, mut task: Task) -> Result<SaveOutcome, AppError> {
        task.validate()?;

        match id {
            None => {
                task.origin = None;
                let id = self.repo.insert(scope, &task).await?;
                tracing::info!("Tarefa {} criada", id);
                let event = TaskEvent::Created { id: id.clone(), task };
                let warnings = self.hooks.run(scope, &event).await;
                Ok(SaveOutcome::new(id, warnings))
            }
            Some(id) => {
                let previous = self.find(scope, id).await?;
                task.origin = previous.data.origin.clone();
                if previous.data.is_missing_documents_task() {
                    task.contract_id = previous.data.contract_id.clone();
                }
                self.repo.replace(scope, id, &task).await?;
                tracing::info!("Tarefa {} atualizada", id);

                let warnings = if task.is_completed() && !previous.data.is_completed() {
                    let event = TaskEvent::Completed { id: id.to_string(), task };
                    self.hooks.run(scope, &event).await
                } else {
                    Vec::new()
                };
                Ok(SaveOutcome::new(id, warnings))
            }
        }
    }

    /// Marca como concluída. Uma tarefa já concluída fica igual e não gera nova entrada.
    pub async fn complete(&self, scope: &Scope, id: &str) -> Result<SaveOutcome, AppError> {
        let mut current = self.find(scope, id).await?;
        if current.data.is_completed() {
            return Ok(SaveOutcome::new(id, Vec::new()));
        }

        self.repo.set_state(scope, id, TaskState::Completed).await?;
        tracing::info!("Tarefa {} concluída", id);

        current.data.state = TaskState::Completed;
        let event = TaskEvent::Completed { id: id.to_string(), task: current.data };
        let warnings = self.hooks.run(scope, &event).await;
        Ok(SaveOutcome::new(id, warnings))
    }

    pub async fn reopen(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.find(scope, id).await?;
        self.repo.set_state(scope, id, TaskState::Pending).await?;
        tracing::info!("Tarefa {} reaberta", id);
        Ok(())
    }

    /// Alterna Pendente <-> Concluído (checkbox do dashboard).
    pub async fn toggle(&self, scope: &Scope, id: &str) -> Result<SaveOutcome, AppError> {
        let current = self.find(scope, id).await?;
        if current.data.is_completed() {
            self.reopen(scope, id).await?;
            Ok(SaveOutcome::new(id, Vec::new()))
        } else {
            self.complete(scope, id).await
        }
    }

    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.repo.delete(scope, id).await?;
        tracing::info!("Tarefa {} apagada", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        db::{memory_store::MemoryStore, paths::RecordOwner, store::DocumentStore, CrmRepository},
        models::crm::InteractionKind,
        services::hooks::TaskInteractionHook,
    };

    fn fixture() -> (TaskService, TasksRepository, CrmRepository, Scope) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let repo = TasksRepository::new(store.clone());
        let crm = CrmRepository::new(store);
        let hooks = HookChain::new().with(TaskInteractionHook::new(crm.clone()));
        (TaskService::new(repo.clone(), hooks), repo, crm, Scope::new("gestao", "u1"))
    }

    fn task_for(client_id: &str) -> Task {
        Task {
            title: "Pedir IRS".into(),
            assignee: Some("Rui".into()),
            client_id: Some(client_id.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_complete_each_append_one_interaction() {
        let (service, repo, crm, scope) = fixture();
        let owner = RecordOwner::Client("cli1".into());

        let created = service.save(&scope, None, task_for("cli1")).await.unwrap();
        assert_eq!(crm.list_interactions(&scope, &owner).await.unwrap().len(), 1);

        service.complete(&scope, &created.id).await.unwrap();
        // Segunda conclusão não faz nada
        service.complete(&scope, &created.id).await.unwrap();

        let history = crm.list_interactions(&scope, &owner).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().any(|i| i.data.kind == Some(InteractionKind::TaskCompleted)));
        assert!(repo.find(&scope, &created.id).await.unwrap().unwrap().data.is_completed());
    }

    #[tokio::test]
    async fn toggle_reopens_without_history() {
        let (service, repo, crm, scope) = fixture();
        let owner = RecordOwner::Client("cli1".into());
        let created = service.save(&scope, None, task_for("cli1")).await.unwrap();

        service.toggle(&scope, &created.id).await.unwrap();
        service.toggle(&scope, &created.id).await.unwrap();

        let task = repo.find(&scope, &created.id).await.unwrap().unwrap();
        assert_eq!(task.data.state, TaskState::Pending);
        assert_eq!(crm.list_interactions(&scope, &owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn tasks_without_client_leave_no_history() {
        let (service, _repo, crm, scope) = fixture();
        let task = Task { title: "Arquivar".into(), ..Default::default() };
        let outcome = service.save(&scope, None, task).await.unwrap();
        assert!(outcome.warnings.is_empty());
        let owner = RecordOwner::Client("cli1".into());
        assert!(crm.list_interactions(&scope, &owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn origin_cannot_be_set_from_the_form() {
        let (service, repo, _crm, scope) = fixture();
        let mut task = task_for("cli1");
        task.origin = Some(crate::models::tasks::ORIGIN_MISSING_DOCUMENTS.into());

        let created = service.save(&scope, None, task).await.unwrap();
        let saved = repo.find(&scope, &created.id).await.unwrap().unwrap();
        assert!(!saved.data.is_missing_documents_task());
    }

    #[tokio::test]
    async fn completing_an_unknown_task_is_not_found() {
        let (service, _repo, _crm, scope) = fixture();
        let err = service.complete(&scope, "nada").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
