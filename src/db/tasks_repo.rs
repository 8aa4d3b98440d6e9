// src/db/tasks_repo.rs

use std::sync::Arc;

use serde_json::json;

use crate::{
    common::error::AppError,
    db::{
        paths::{Collection, Scope},
        records::{get_record, get_records},
        store::{to_fields, DocumentStore, Fields, Query},
    },
    models::{
        record::Record,
        tasks::{Task, TaskState, ORIGIN_MISSING_DOCUMENTS},
    },
};

#[derive(Clone)]
pub struct TasksRepository {
    store: Arc<dyn DocumentStore>,
}

impl TasksRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn tasks_query(&self, scope: &Scope) -> Query {
        Query::all(scope.collection(Collection::Tasks))
    }

    pub async fn find(&self, scope: &Scope, id: &str) -> Result<Option<Record<Task>>, AppError> {
        get_record(self.store.as_ref(), &scope.collection(Collection::Tasks), id).await
    }

    /// Tarefas automáticas de "documentos em falta" de um contrato.
    pub async fn missing_documents_tasks(
        &self,
        scope: &Scope,
        contract_id: &str,
    ) -> Result<Vec<Record<Task>>, AppError> {
        let query = self
            .tasks_query(scope)
            .where_eq("contratoId", contract_id)
            .where_eq("origem", ORIGIN_MISSING_DOCUMENTS);
        get_records(self.store.as_ref(), &query).await
    }

    pub async fn insert(&self, scope: &Scope, task: &Task) -> Result<String, AppError> {
        self.store
            .insert(&scope.collection(Collection::Tasks), to_fields(task)?)
            .await
    }

    pub async fn replace(&self, scope: &Scope, id: &str, task: &Task) -> Result<(), AppError> {
        self.store
            .set(&scope.collection(Collection::Tasks), id, to_fields(task)?)
            .await
    }

    /// Muda só o estado (a tarefa tem de existir).
    pub async fn set_state(&self, scope: &Scope, id: &str, state: TaskState) -> Result<(), AppError> {
        let mut fields = Fields::new();
        fields.insert("estado".to_string(), json!(state));
        self.store
            .update(&scope.collection(Collection::Tasks), id, fields)
            .await
    }

    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.store.delete(&scope.collection(Collection::Tasks), id).await
    }
}
