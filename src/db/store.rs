// src/db/store.rs
//
// A fronteira com o banco de documentos. O núcleo só conhece este trait;
// `MemoryStore` e `PgDocumentStore` são as implementações.

use std::{future::Future, pin::Pin};

use async_trait::async_trait;
use futures::Stream;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{common::error::AppError, db::paths::CollectionPath};

/// Campos de um documento (objeto JSON sem esquema).
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Predicado de igualdade empurrado para a própria consulta.
#[derive(Debug, Clone, PartialEq)]
pub struct EqFilter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<EqFilter>,
}

impl Query {
    pub fn all(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
        }
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(EqFilter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|f| fields.get(&f.field) == Some(&f.value))
    }
}

/// O conjunto completo de resultados de uma consulta num dado momento.
/// `sequence` cresce monotonicamente dentro de uma subscrição.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<Document>,
    pub sequence: u64,
}

pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Snapshot, AppError>> + Send>>;

/// Capacidade do feed de alterações partilhado pelas subscrições de um banco.
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// Subscrição guiada por um feed de alterações (um caminho de coleção por aviso).
///
/// Todas as subscrições de um banco partilham o mesmo feed; cada aviso da coleção
/// da consulta relê o resultado com `fetch` e só emite se ele mudou.
/// O chamador deve inscrever-se no feed antes de ler `initial`.
pub fn change_stream<F, Fut>(
    mut feed: broadcast::Receiver<String>,
    query: Query,
    initial: Snapshot,
    fetch: F,
) -> SnapshotStream
where
    F: Fn(Query) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<Document>, AppError>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut sequence = initial.sequence;
        let mut last = initial.documents.clone();
        yield Ok(initial);

        loop {
            match feed.recv().await {
                Ok(path) if path == query.collection.as_str() => {}
                Ok(_) => continue,
                // Perdemos avisos: relemos de qualquer forma.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscrição de {} atrasada ({} avisos)", query.collection, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }

            match fetch(query.clone()).await {
                Ok(documents) if documents == last => continue,
                Ok(documents) => {
                    sequence += 1;
                    last = documents.clone();
                    yield Ok(Snapshot { documents, sequence });
                }
                Err(e) => yield Err(e),
            }
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Cria ou substitui o documento inteiro.
    Set { collection: CollectionPath, id: String, fields: Fields },
    /// Cria ou funde os campos indicados com os existentes.
    Merge { collection: CollectionPath, id: String, fields: Fields },
    /// Funde campos num documento que tem de existir.
    Update { collection: CollectionPath, id: String, fields: Fields },
    /// Soma `by` a um campo numérico de um documento que tem de existir.
    Increment { collection: CollectionPath, id: String, field: String, by: Decimal },
    Delete { collection: CollectionPath, id: String },
}

impl WriteOp {
    pub fn collection(&self) -> &CollectionPath {
        match self {
            WriteOp::Set { collection, .. }
            | WriteOp::Merge { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Increment { collection, .. }
            | WriteOp::Delete { collection, .. } => collection,
        }
    }
}

/// Escrita atómica de vários documentos: ou tudo é aplicado, ou nada.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &CollectionPath, id: &str, fields: Fields) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection: collection.clone(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn merge(&mut self, collection: &CollectionPath, id: &str, fields: Fields) -> &mut Self {
        self.ops.push(WriteOp::Merge {
            collection: collection.clone(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn update(&mut self, collection: &CollectionPath, id: &str, fields: Fields) -> &mut Self {
        self.ops.push(WriteOp::Update {
            collection: collection.clone(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn increment(
        &mut self,
        collection: &CollectionPath,
        id: &str,
        field: &str,
        by: Decimal,
    ) -> &mut Self {
        self.ops.push(WriteOp::Increment {
            collection: collection.clone(),
            id: id.to_string(),
            field: field.to_string(),
            by,
        });
        self
    }

    pub fn delete(&mut self, collection: &CollectionPath, id: &str) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.clone(),
            id: id.to_string(),
        });
        self
    }
}

/// Gera um id de documento novo.
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Abre uma subscrição em tempo real. O primeiro item é o estado atual;
    /// depois, um snapshot completo por cada alteração do resultado.
    async fn subscribe(&self, query: Query) -> Result<SnapshotStream, AppError>;

    /// Leitura única com filtro.
    async fn get(&self, query: &Query) -> Result<Vec<Document>, AppError>;

    async fn get_by_id(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, AppError>;

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError>;

    async fn insert(&self, collection: &CollectionPath, fields: Fields) -> Result<String, AppError> {
        let id = new_document_id();
        let mut batch = WriteBatch::new();
        batch.set(collection, &id, fields);
        self.commit(batch).await?;
        Ok(id)
    }

    async fn set(&self, collection: &CollectionPath, id: &str, fields: Fields) -> Result<(), AppError> {
        let mut batch = WriteBatch::new();
        batch.set(collection, id, fields);
        self.commit(batch).await
    }

    async fn upsert(&self, collection: &CollectionPath, id: &str, fields: Fields) -> Result<(), AppError> {
        let mut batch = WriteBatch::new();
        batch.merge(collection, id, fields);
        self.commit(batch).await
    }

    async fn update(&self, collection: &CollectionPath, id: &str, fields: Fields) -> Result<(), AppError> {
        let mut batch = WriteBatch::new();
        batch.update(collection, id, fields);
        self.commit(batch).await
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), AppError> {
        let mut batch = WriteBatch::new();
        batch.delete(collection, id);
        self.commit(batch).await
    }
}

/// Serializa um modelo para os campos de um documento.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InternalServerError(anyhow::anyhow!(
            "esperado um objeto JSON, obtido {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use futures::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::db::paths::{Collection, Scope};

    fn doc(id: &str, value: i64) -> Document {
        Document {
            id: id.to_string(),
            fields: json!({ "valor": value }).as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn one_feed_drives_many_subscriptions() {
        let scope = Scope::new("gestao", "u1");
        let tasks = scope.collection(Collection::Tasks);
        let clients = scope.collection(Collection::Clients);
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut streams = Vec::new();
        for _ in 0..8 {
            let fetches = fetches.clone();
            let initial = Snapshot { documents: vec![doc("t1", 1)], sequence: 0 };
            streams.push(change_stream(
                changes.subscribe(),
                Query::all(tasks.clone()),
                initial,
                move |_query| {
                    let n = fetches.fetch_add(1, Ordering::SeqCst) as i64;
                    async move { Ok(vec![doc("t1", 2 + n)]) }
                },
            ));
        }
        for stream in &mut streams {
            assert_eq!(stream.next().await.unwrap().unwrap().sequence, 0);
        }

        // Avisos de outra coleção não provocam releituras
        changes.send(clients.as_str().to_string()).unwrap();
        changes.send(tasks.as_str().to_string()).unwrap();

        for stream in &mut streams {
            let snapshot = stream.next().await.unwrap().unwrap();
            assert_eq!(snapshot.sequence, 1);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn unchanged_results_are_not_emitted_again() {
        let tasks = Scope::new("gestao", "u1").collection(Collection::Tasks);
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let initial = Snapshot { documents: vec![doc("t1", 1)], sequence: 3 };
        let mut stream = change_stream(changes.subscribe(), Query::all(tasks.clone()), initial, |_query| async {
            Ok(vec![doc("t1", 1)])
        });
        assert_eq!(stream.next().await.unwrap().unwrap().sequence, 3);

        changes.send(tasks.as_str().to_string()).unwrap();
        drop(changes);
        // Feed fechado sem nada de novo: o stream termina sem emitir
        assert!(stream.next().await.is_none());
    }
}
