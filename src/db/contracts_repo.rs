// src/db/contracts_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        paths::{Collection, Scope},
        records::{get_record, get_records},
        store::{to_fields, DocumentStore, Query},
    },
    models::{contracts::Contract, record::Record},
};

#[derive(Clone)]
pub struct ContractsRepository {
    store: Arc<dyn DocumentStore>,
}

impl ContractsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn contracts_query(&self, scope: &Scope) -> Query {
        Query::all(scope.collection(Collection::Contracts))
    }

    /// Contratos de um cliente: o filtro vai na própria consulta.
    pub fn contracts_of_client_query(&self, scope: &Scope, client_id: &str) -> Query {
        self.contracts_query(scope).where_eq("clienteId", client_id)
    }

    pub async fn list(&self, scope: &Scope) -> Result<Vec<Record<Contract>>, AppError> {
        get_records(self.store.as_ref(), &self.contracts_query(scope)).await
    }

    pub async fn find(&self, scope: &Scope, id: &str) -> Result<Option<Record<Contract>>, AppError> {
        get_record(self.store.as_ref(), &scope.collection(Collection::Contracts), id).await
    }

    pub async fn insert(&self, scope: &Scope, contract: &Contract) -> Result<String, AppError> {
        self.store
            .insert(&scope.collection(Collection::Contracts), to_fields(contract)?)
            .await
    }

    pub async fn replace(&self, scope: &Scope, id: &str, contract: &Contract) -> Result<(), AppError> {
        self.store
            .set(&scope.collection(Collection::Contracts), id, to_fields(contract)?)
            .await
    }

    pub async fn delete(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.store
            .delete(&scope.collection(Collection::Contracts), id)
            .await
    }
}
