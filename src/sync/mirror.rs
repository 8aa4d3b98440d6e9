// src/sync/mirror.rs
//
// Um espelho = uma subscrição + uma tarefa que publica o conjunto completo de
// registos num canal `watch`. As vistas abrem vários espelhos num `MirrorSet`
// e fecham-nos todos juntos quando são largadas.

use std::sync::Arc;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    db::store::{DocumentStore, Query},
    models::record::{decode_all, Record},
};

/// Fatia de estado mantida por um espelho.
#[derive(Debug, Clone)]
pub struct MirrorState<T> {
    pub records: Vec<Record<T>>,
    pub loading: bool,
    pub error: Option<String>,
    // Sequência do último snapshot aplicado; só cresce
    pub sequence: u64,
}

impl<T> Default for MirrorState<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            error: None,
            sequence: 0,
        }
    }
}

pub type MirrorReceiver<T> = watch::Receiver<MirrorState<T>>;

/// Conjunto de espelhos de uma vista. Largar o conjunto cancela todas as subscrições.
#[derive(Default)]
pub struct MirrorSet {
    handles: Vec<JoinHandle<()>>,
}

impl MirrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open<T>(
        &mut self,
        store: Arc<dyn DocumentStore>,
        query: Query,
        label: &'static str,
    ) -> MirrorReceiver<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(MirrorState::default());
        self.handles.push(tokio::spawn(run_mirror(store, query, label, tx)));
        rx
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for MirrorSet {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn run_mirror<T>(
    store: Arc<dyn DocumentStore>,
    query: Query,
    label: &'static str,
    tx: watch::Sender<MirrorState<T>>,
) where
    T: DeserializeOwned + Send + Sync + 'static,
{
    match store.subscribe(query).await {
        Ok(mut stream) => {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(snapshot) => {
                        let records = decode_all(label, snapshot.documents);
                        tx.send_replace(MirrorState {
                            records,
                            loading: false,
                            error: None,
                            sequence: snapshot.sequence,
                        });
                    }
                    Err(e) => {
                        tracing::error!("Erro ao carregar {}: {}", label, e);
                        tx.send_modify(|state| {
                            state.loading = false;
                            state.error = Some(e.to_string());
                        });
                    }
                }
                if tx.is_closed() {
                    return;
                }
            }
            tracing::warn!("Subscrição de {} terminou", label);
        }
        Err(e) => {
            tracing::error!("Erro ao subscrever {}: {}", label, e);
            tx.send_modify(|state| {
                state.loading = false;
                state.error = Some(e.to_string());
            });
        }
    }

    // O emissor só é largado quando a vista larga o recetor.
    tx.closed().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::AppError,
        db::{
            memory_store::MemoryStore,
            paths::{Collection, Scope},
            store::{Fields, SnapshotStream},
        },
        models::tasks::Task,
    };
    use async_trait::async_trait;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    async fn wait_loaded<T: Clone>(rx: &mut MirrorReceiver<T>) -> MirrorState<T> {
        rx.wait_for(|state| !state.loading).await.unwrap().clone()
    }

    #[tokio::test]
    async fn mirror_replaces_its_slice_on_every_change() {
        let store = Arc::new(MemoryStore::new());
        let tasks = Scope::new("gestao", "u1").collection(Collection::Tasks);
        store.set(&tasks, "t1", fields(json!({ "titulo": "Ligar" }))).await.unwrap();

        let mut set = MirrorSet::new();
        let mut rx = set.open::<Task>(store.clone(), Query::all(tasks.clone()), "tarefas");

        let first = wait_loaded(&mut rx).await;
        assert_eq!(first.records.len(), 1);

        store.set(&tasks, "t2", fields(json!({ "titulo": "Enviar" }))).await.unwrap();
        let second = rx
            .wait_for(|state| state.records.len() == 2)
            .await
            .unwrap()
            .clone();
        assert!(second.sequence > first.sequence);
    }

    #[tokio::test]
    async fn odd_field_types_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        let tasks = Scope::new("gestao", "u1").collection(Collection::Tasks);
        store.set(&tasks, "ok", fields(json!({ "titulo": "Ligar" }))).await.unwrap();
        // `titulo` como objeto não é texto nem vazio: o modelo tolerante volta ao valor por omissão
        store.set(&tasks, "estranho", fields(json!({ "titulo": { "x": 1 } }))).await.unwrap();

        let mut set = MirrorSet::new();
        let mut rx = set.open::<Task>(store, Query::all(tasks), "tarefas");
        let state = wait_loaded(&mut rx).await;
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[0].data.title, "");
    }

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn subscribe(&self, _query: Query) -> Result<SnapshotStream, AppError> {
            Err(AppError::BackendUnavailable("sem ligação".into()))
        }
        async fn get(&self, _query: &Query) -> Result<Vec<crate::db::store::Document>, AppError> {
            Err(AppError::BackendUnavailable("sem ligação".into()))
        }
        async fn get_by_id(
            &self,
            _collection: &crate::db::paths::CollectionPath,
            _id: &str,
        ) -> Result<Option<crate::db::store::Document>, AppError> {
            Ok(None)
        }
        async fn commit(&self, _batch: crate::db::store::WriteBatch) -> Result<(), AppError> {
            Err(AppError::BackendUnavailable("sem ligação".into()))
        }
    }

    #[tokio::test]
    async fn failed_subscription_clears_only_its_own_loading_flag() {
        let healthy = Arc::new(MemoryStore::new());
        let scope = Scope::new("gestao", "u1");
        let tasks = scope.collection(Collection::Tasks);
        healthy.set(&tasks, "t1", fields(json!({ "titulo": "Ligar" }))).await.unwrap();

        let mut set = MirrorSet::new();
        let mut broken = set.open::<Task>(Arc::new(BrokenStore), Query::all(tasks.clone()), "tarefas");
        let mut ok = set.open::<Task>(healthy, Query::all(tasks), "tarefas");

        let broken_state = wait_loaded(&mut broken).await;
        assert!(broken_state.error.is_some());
        assert!(broken_state.records.is_empty());

        let ok_state = wait_loaded(&mut ok).await;
        assert!(ok_state.error.is_none());
        assert_eq!(ok_state.records.len(), 1);
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn dropping_the_set_closes_the_mirrors() {
        let store = Arc::new(MemoryStore::new());
        let tasks = Scope::new("gestao", "u1").collection(Collection::Tasks);

        let mut set = MirrorSet::new();
        let mut rx = set.open::<Task>(store, Query::all(tasks), "tarefas");
        wait_loaded(&mut rx).await;

        drop(set);
        // A tarefa abortada larga o emissor: o recetor vê o canal fechado.
        assert!(rx.changed().await.is_err());
    }
}
