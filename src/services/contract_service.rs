// src/services/contract_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{paths::Scope, ContractsRepository, CrmRepository},
    models::{contracts::Contract, record::Record},
    services::hooks::{ContractSaved, HookChain, SaveOutcome},
};

#[derive(Clone)]
pub struct ContractService {
    repo: ContractsRepository,
    crm: CrmRepository,
    hooks: HookChain<ContractSaved>,
}

impl ContractService {
    pub fn new(repo: ContractsRepository, crm: CrmRepository, hooks: HookChain<ContractSaved>) -> Self {
        Self { repo, crm, hooks }
    }

    /// Cria ou substitui um contrato e depois corre os efeitos secundários.
    ///
    /// O nome do cliente é copiado para o contrato no momento da gravação e não volta
    /// a ser sincronizado se o cliente mudar de nome.
    pub async fn save(
        &self,
        scope: &Scope,
        id: Option<&str>,
        mut contract: Contract,
    ) -> Result<SaveOutcome, AppError> {
        contract.validate()?;

        let client = self
            .crm
            .find_client(scope, &contract.client_id)
            .await?
            .ok_or_else(|| AppError::invalid("O cliente selecionado não existe."))?;
        contract.client_name = client.data.name;

        let id = match id {
            Some(id) => {
                if self.repo.find(scope, id).await?.is_none() {
                    return Err(AppError::NotFound("Contrato".into()));
                }
                self.repo.replace(scope, id, &contract).await?;
                tracing::info!("Contrato {} atualizado", id);
                id.to_string()
            }
            None => {
                let id = self.repo.insert(scope, &contract).await?;
                tracing::info!("Contrato {} criado para {}", id, contract.client_name);
                id
            }
        };

        let event = ContractSaved { id, contract };
        let warnings = self.hooks.run(scope, &event).await;
        Ok(SaveOutcome::new(event.id, warnings))
    }

    pub async fn get(&self, scope: &Scope, id: &str) -> Result<Record<Contract>, AppError> {
        self.repo
            .find(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contrato".into()))
    }

    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.repo.delete(scope, id).await?;
        tracing::info!("Contrato {} apagado", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        db::{memory_store::MemoryStore, store::DocumentStore, TasksRepository},
        models::{
            crm::Client,
            tasks::{Priority, Task},
        },
        services::{hooks::MissingDocumentsTaskHook, task_service::TaskService},
    };
    use chrono::{Duration, Local};

    struct Fixture {
        service: ContractService,
        tasks: TasksRepository,
        crm: CrmRepository,
        scope: Scope,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let tasks = TasksRepository::new(store.clone());
        let crm = CrmRepository::new(store.clone());
        let hooks = HookChain::new().with(MissingDocumentsTaskHook::new(tasks.clone()));
        Fixture {
            service: ContractService::new(ContractsRepository::new(store), crm.clone(), hooks),
            tasks,
            crm,
            scope: Scope::new("gestao", "u1"),
        }
    }

    async fn client(f: &Fixture, name: &str) -> String {
        let client = Client { name: name.into(), ..Default::default() };
        f.crm.insert_client(&f.scope, &client).await.unwrap()
    }

    #[tokio::test]
    async fn missing_documents_create_exactly_one_task() {
        let f = fixture();
        let client_id = client(&f, "Ana").await;
        let contract = Contract {
            client_id: client_id.clone(),
            sales_rep: Some("Rui".into()),
            missing_documents: true,
            ..Default::default()
        };

        let outcome = f.service.save(&f.scope, None, contract).await.unwrap();
        assert!(outcome.warnings.is_empty());

        let tasks = f.tasks.missing_documents_tasks(&f.scope, &outcome.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0].data;
        let due = (Local::now().date_naive() + Duration::days(7)).format("%Y-%m-%d").to_string();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date.as_deref(), Some(due.as_str()));
        assert_eq!(task.client_id.as_deref(), Some(client_id.as_str()));
        assert_eq!(task.title, "Documentação pendente para o contrato de Ana");
    }

    #[tokio::test]
    async fn editing_the_automatic_task_keeps_it_the_only_one() {
        let f = fixture();
        let client_id = client(&f, "Ana").await;
        let contract = Contract {
            client_id,
            missing_documents: true,
            ..Default::default()
        };
        let outcome = f.service.save(&f.scope, None, contract.clone()).await.unwrap();
        let auto = f.tasks.missing_documents_tasks(&f.scope, &outcome.id).await.unwrap();
        assert_eq!(auto.len(), 1);

        // O formulário de edição não devolve `origem` nem `contratoId`
        let tasks = TaskService::new(f.tasks.clone(), HookChain::new());
        let edited = Task {
            title: "Pedir DUA ao cliente".into(),
            priority: Priority::High,
            ..Default::default()
        };
        tasks.save(&f.scope, Some(&auto[0].id), edited).await.unwrap();

        f.service.save(&f.scope, Some(&outcome.id), contract).await.unwrap();

        let auto = f.tasks.missing_documents_tasks(&f.scope, &outcome.id).await.unwrap();
        assert_eq!(auto.len(), 1);
        assert_eq!(auto[0].data.title, "Pedir DUA ao cliente");
    }

    #[tokio::test]
    async fn client_name_is_copied_at_write_time() {
        let f = fixture();
        let client_id = client(&f, "Ana").await;
        let contract = Contract {
            client_id,
            client_name: "qualquer coisa".into(),
            ..Default::default()
        };

        let outcome = f.service.save(&f.scope, None, contract).await.unwrap();
        let saved = f.service.get(&f.scope, &outcome.id).await.unwrap();
        assert_eq!(saved.data.client_name, "Ana");
        assert!(f.tasks.missing_documents_tasks(&f.scope, &outcome.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_client_is_rejected_before_writing() {
        let f = fixture();
        let contract = Contract { client_id: "fantasma".into(), ..Default::default() };
        let err = f.service.save(&f.scope, None, contract).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
