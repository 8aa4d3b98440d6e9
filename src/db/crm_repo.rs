// src/db/crm_repo.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{
        paths::{Collection, RecordOwner, Scope, SubCollection},
        records::{get_record, get_records},
        store::{to_fields, DocumentStore, Query},
    },
    models::{
        crm::{AttachedDocument, Client, Interaction},
        record::Record,
    },
};

#[derive(Clone)]
pub struct CrmRepository {
    store: Arc<dyn DocumentStore>,
}

impl CrmRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub fn clients_query(&self, scope: &Scope) -> Query {
        Query::all(scope.collection(Collection::Clients))
    }

    pub async fn find_client(
        &self,
        scope: &Scope,
        id: &str,
    ) -> Result<Option<Record<Client>>, AppError> {
        get_record(self.store.as_ref(), &scope.collection(Collection::Clients), id).await
    }

    /// Clientes com um dado NIF. Os documentos antigos podem ter o NIF gravado como número.
    pub async fn find_clients_by_nif(
        &self,
        scope: &Scope,
        nif: &str,
    ) -> Result<Vec<Record<Client>>, AppError> {
        let mut found: Vec<Record<Client>> = get_records(
            self.store.as_ref(),
            &self.clients_query(scope).where_eq("nif", nif),
        )
        .await?;

        if let Ok(number) = nif.parse::<u64>() {
            let legacy: Vec<Record<Client>> = get_records(
                self.store.as_ref(),
                &self.clients_query(scope).where_eq("nif", number),
            )
            .await?;
            found.extend(legacy);
        }
        Ok(found)
    }

    pub async fn insert_client(&self, scope: &Scope, client: &Client) -> Result<String, AppError> {
        self.store
            .insert(&scope.collection(Collection::Clients), to_fields(client)?)
            .await
    }

    /// Substitui o documento inteiro (o formulário envia sempre todos os campos).
    pub async fn replace_client(
        &self,
        scope: &Scope,
        id: &str,
        client: &Client,
    ) -> Result<(), AppError> {
        self.store
            .set(&scope.collection(Collection::Clients), id, to_fields(client)?)
            .await
    }

    pub async fn delete_client(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.store
            .delete(&scope.collection(Collection::Clients), id)
            .await
    }

    // =========================================================================
    //  INTERAÇÕES E DOCUMENTOS (sub-coleções de cliente e contrato)
    // =========================================================================

    /// O cliente ou contrato dono da sub-coleção existe?
    pub async fn owner_exists(&self, scope: &Scope, owner: &RecordOwner) -> Result<bool, AppError> {
        let parent = scope.collection(owner.parent());
        Ok(self.store.get_by_id(&parent, owner.id()).await?.is_some())
    }

    pub fn interactions_query(&self, scope: &Scope, owner: &RecordOwner) -> Result<Query, AppError> {
        Ok(Query::all(scope.sub_collection(owner, SubCollection::Interactions)?))
    }

    pub fn documents_query(&self, scope: &Scope, owner: &RecordOwner) -> Result<Query, AppError> {
        Ok(Query::all(scope.sub_collection(owner, SubCollection::Documents)?))
    }

    pub async fn list_interactions(
        &self,
        scope: &Scope,
        owner: &RecordOwner,
    ) -> Result<Vec<Record<Interaction>>, AppError> {
        get_records(self.store.as_ref(), &self.interactions_query(scope, owner)?).await
    }

    /// Acrescenta uma entrada ao histórico. Nunca se edita nem apaga.
    pub async fn append_interaction(
        &self,
        scope: &Scope,
        owner: &RecordOwner,
        interaction: &Interaction,
    ) -> Result<String, AppError> {
        let path = scope.sub_collection(owner, SubCollection::Interactions)?;
        self.store.insert(&path, to_fields(interaction)?).await
    }

    pub async fn add_document(
        &self,
        scope: &Scope,
        owner: &RecordOwner,
        document: &AttachedDocument,
    ) -> Result<String, AppError> {
        let path = scope.sub_collection(owner, SubCollection::Documents)?;
        self.store.insert(&path, to_fields(document)?).await
    }
}
