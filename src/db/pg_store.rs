// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgListener, PgPoolOptions},
    types::Json,
    PgPool, Postgres, Transaction,
};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::{
    common::error::AppError,
    db::{
        paths::CollectionPath,
        store::{
            change_stream, Document, DocumentStore, Fields, Query, Snapshot, SnapshotStream, WriteBatch,
            WriteOp, CHANGE_FEED_CAPACITY,
        },
    },
};

const CHANGE_CHANNEL: &str = "document_changes";

/// Banco de documentos sobre uma tabela JSONB do Postgres.
///
/// Um único `PgListener`, com ligação própria fora do pool, escuta o LISTEN/NOTIFY
/// (ver a migração `documents`) e reencaminha os avisos para um `broadcast`.
/// As subscrições só usam o pool para reler quando chega um aviso da sua coleção.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<String>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, changes: broadcast::Sender<String>) -> Self {
        Self { pool, changes }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("✅ Migrações do banco de documentos executadas com sucesso!");

        let mut listener = PgListener::connect(database_url).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        tokio::spawn(forward_changes(listener, changes.clone()));

        Ok(Self::new(pool, changes))
    }

    async fn fetch(pool: &PgPool, query: &Query) -> Result<Vec<Document>, AppError> {
        // Os filtros de igualdade viram um objeto de contenção: fields @> {"estado":"Ativo"}
        let containment: Fields = query
            .filters
            .iter()
            .map(|f| (f.field.clone(), f.value.clone()))
            .collect();

        let rows = sqlx::query_as::<_, (String, Json<Value>)>(
            r#"
            SELECT id, fields
            FROM documents
            WHERE collection = $1 AND fields @> $2
            ORDER BY id ASC
            "#,
        )
        .bind(query.collection.as_str())
        .bind(Json(Value::Object(containment)))
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(fields))| Document {
                id,
                fields: match fields {
                    Value::Object(map) => map,
                    _ => Fields::new(),
                },
            })
            .collect())
    }

    async fn apply(tx: &mut Transaction<'_, Postgres>, op: WriteOp) -> Result<(), AppError> {
        match op {
            WriteOp::Set { collection, id, fields } => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, fields)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (collection, id)
                    DO UPDATE SET fields = EXCLUDED.fields, updated_at = now()
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(Json(Value::Object(fields)))
                .execute(&mut **tx)
                .await?;
            }
            WriteOp::Merge { collection, id, fields } => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, fields)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (collection, id)
                    DO UPDATE SET fields = documents.fields || EXCLUDED.fields, updated_at = now()
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(Json(Value::Object(fields)))
                .execute(&mut **tx)
                .await?;
            }
            WriteOp::Update { collection, id, fields } => {
                let result = sqlx::query(
                    r#"
                    UPDATE documents
                    SET fields = fields || $3, updated_at = now()
                    WHERE collection = $1 AND id = $2
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(Json(Value::Object(fields)))
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("Documento {}/{}", collection, id)));
                }
            }
            WriteOp::Increment { collection, id, field, by } => {
                let result = sqlx::query(
                    r#"
                    UPDATE documents
                    SET fields = jsonb_set(
                            fields,
                            ARRAY[$3::text],
                            to_jsonb(COALESCE(NULLIF(fields->>$3, '')::numeric, 0) + $4),
                            true
                        ),
                        updated_at = now()
                    WHERE collection = $1 AND id = $2
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(&field)
                .bind(by)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("Documento {}/{}", collection, id)));
                }
            }
            WriteOp::Delete { collection, id } => {
                sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                    .bind(collection.as_str())
                    .bind(&id)
                    .execute(&mut **tx)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Reencaminha os avisos do Postgres para o feed partilhado.
/// O `PgListener` volta a ligar-se sozinho; entre falhas espera um segundo.
async fn forward_changes(mut listener: PgListener, changes: broadcast::Sender<String>) {
    loop {
        match listener.recv().await {
            Ok(notification) => {
                // Sem subscritores o envio falha, e não faz mal
                let _ = changes.send(notification.payload().to_string());
            }
            Err(e) => {
                tracing::error!("Erro ao escutar {}: {}", CHANGE_CHANNEL, e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn subscribe(&self, query: Query) -> Result<SnapshotStream, AppError> {
        let feed = self.changes.subscribe();
        let documents = Self::fetch(&self.pool, &query).await?;
        let pool = self.pool.clone();

        Ok(change_stream(feed, query, Snapshot { documents, sequence: 0 }, move |query| {
            let pool = pool.clone();
            async move { Self::fetch(&pool, &query).await }
        }))
    }

    async fn get(&self, query: &Query) -> Result<Vec<Document>, AppError> {
        Self::fetch(&self.pool, query).await
    }

    async fn get_by_id(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<_, (Json<Value>,)>(
            "SELECT fields FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(fields),)| Document {
            id: id.to_string(),
            fields: match fields {
                Value::Object(map) => map,
                _ => Fields::new(),
            },
        }))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        // Uma transação por lote; se qualquer operação falhar, o drop faz rollback.
        let mut tx = self.pool.begin().await?;
        for op in batch.ops {
            Self::apply(&mut tx, op).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
