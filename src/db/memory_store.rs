// src/db/memory_store.rs

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::{
    common::{error::AppError, lenient::decimal_from_value},
    db::{
        paths::CollectionPath,
        store::{
            change_stream, Document, DocumentStore, Fields, Query, Snapshot, SnapshotStream, WriteBatch,
            WriteOp, CHANGE_FEED_CAPACITY,
        },
    },
};

#[derive(Default)]
struct State {
    // caminho da coleção -> (id -> campos). BTreeMap dá uma ordem estável aos snapshots.
    collections: HashMap<String, BTreeMap<String, Fields>>,
    sequence: u64,
}

impl State {
    fn snapshot(&self, query: &Query) -> Snapshot {
        let documents = self
            .collections
            .get(query.collection.as_str())
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| query.matches(fields))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Snapshot {
            documents,
            sequence: self.sequence,
        }
    }

    fn exists(&self, collection: &CollectionPath, id: &str) -> bool {
        self.collections
            .get(collection.as_str())
            .is_some_and(|docs| docs.contains_key(id))
    }

    // Verifica todas as pré-condições antes de tocar em qualquer documento.
    fn check(&self, op: &WriteOp) -> Result<(), AppError> {
        match op {
            WriteOp::Update { collection, id, .. } => {
                if !self.exists(collection, id) {
                    return Err(AppError::NotFound(format!("Documento {}/{}", collection, id)));
                }
            }
            WriteOp::Increment { collection, id, field, by } => {
                let doc = self
                    .collections
                    .get(collection.as_str())
                    .and_then(|docs| docs.get(id))
                    .ok_or_else(|| AppError::NotFound(format!("Documento {}/{}", collection, id)))?;
                let current = match doc.get(field) {
                    None | Some(Value::Null) => rust_decimal::Decimal::ZERO,
                    Some(value) => decimal_from_value(value).ok_or_else(|| {
                        AppError::invalid(format!(
                            "O campo '{}' de {}/{} não é numérico",
                            field, collection, id
                        ))
                    })?,
                };
                if current.checked_add(*by).is_none() {
                    return Err(AppError::invalid(format!(
                        "O campo '{}' de {}/{} excede o valor máximo",
                        field, collection, id
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply(&mut self, op: WriteOp) -> Result<(), AppError> {
        match op {
            WriteOp::Set { collection, id, fields } => {
                self.docs_mut(&collection).insert(id, fields);
            }
            WriteOp::Merge { collection, id, fields } | WriteOp::Update { collection, id, fields } => {
                let doc = self.docs_mut(&collection).entry(id).or_default();
                for (key, value) in fields {
                    doc.insert(key, value);
                }
            }
            WriteOp::Increment { collection, id, field, by } => {
                let doc = self.docs_mut(&collection).entry(id).or_default();
                let current = doc.get(&field).and_then(decimal_from_value).unwrap_or_default();
                doc.insert(field, serde_json::to_value(current.saturating_add(by))?);
            }
            WriteOp::Delete { collection, id } => {
                self.docs_mut(&collection).remove(&id);
            }
        }
        Ok(())
    }

    fn docs_mut(&mut self, collection: &CollectionPath) -> &mut BTreeMap<String, Fields> {
        self.collections
            .entry(collection.as_str().to_string())
            .or_default()
    }
}

/// Banco de documentos em memória com subscrições em tempo real.
/// Usado quando não há `DATABASE_URL` e como duplo de teste.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    changes: broadcast::Sender<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(State::default())),
            changes,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe(&self, query: Query) -> Result<SnapshotStream, AppError> {
        // Inscreve-se no feed ANTES de ler o estado inicial, para não perder alterações.
        let feed = self.changes.subscribe();
        let initial = self.state.read().await.snapshot(&query);
        let state = Arc::clone(&self.state);

        Ok(change_stream(feed, query, initial, move |query| {
            let state = Arc::clone(&state);
            async move { Ok(state.read().await.snapshot(&query).documents) }
        }))
    }

    async fn get(&self, query: &Query) -> Result<Vec<Document>, AppError> {
        Ok(self.state.read().await.snapshot(query).documents)
    }

    async fn get_by_id(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection.as_str())
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        if batch.ops.is_empty() {
            return Ok(());
        }

        let touched: HashSet<String> = batch
            .ops
            .iter()
            .map(|op| op.collection().as_str().to_string())
            .collect();

        {
            let mut state = self.state.write().await;
            for op in &batch.ops {
                state.check(op)?;
            }

            // Aplica sobre uma cópia das coleções tocadas: se algo falhar a meio,
            // o estado visível fica intacto.
            let mut working = State {
                collections: touched
                    .iter()
                    .map(|path| (path.clone(), state.collections.get(path).cloned().unwrap_or_default()))
                    .collect(),
                sequence: state.sequence,
            };
            for op in batch.ops {
                working.apply(op)?;
            }
            state.collections.extend(working.collections);
            state.sequence += 1;
        }

        for path in touched {
            // Sem subscritores o envio falha; não é um erro.
            let _ = self.changes.send(path);
        }
        Ok(())
    }
}

/// Lê um campo numérico de um documento (útil nos testes e nos saldos).
pub fn numeric_field(fields: &Fields, field: &str) -> Option<rust_decimal::Decimal> {
    fields.get(field).and_then(|v: &Value| decimal_from_value(v))
}
