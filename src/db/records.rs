// src/db/records.rs
//
// Leituras tipadas por cima do `DocumentStore`, partilhadas pelos repositórios.

use serde::de::DeserializeOwned;

use crate::{
    common::error::AppError,
    db::{
        paths::CollectionPath,
        store::{DocumentStore, Query},
    },
    models::record::{decode_all, Record},
};

pub async fn get_records<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    query: &Query,
) -> Result<Vec<Record<T>>, AppError> {
    let documents = store.get(query).await?;
    Ok(decode_all(query.collection.as_str(), documents))
}

pub async fn get_record<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &CollectionPath,
    id: &str,
) -> Result<Option<Record<T>>, AppError> {
    match store.get_by_id(collection, id).await? {
        Some(doc) => Ok(Some(Record::from_document(doc)?)),
        None => Ok(None),
    }
}
