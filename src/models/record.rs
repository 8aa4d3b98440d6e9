// src/models/record.rs

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::db::store::Document;

/// Um documento já tipado: o id do banco + os campos do modelo, achatados no JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T: DeserializeOwned> Record<T> {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        let data = serde_json::from_value(Value::Object(doc.fields))?;
        Ok(Self { id: doc.id, data })
    }
}

/// Converte um snapshot em registos. Documentos que nem o modelo tolerante consegue
/// ler são ignorados (com aviso), em vez de derrubar o espelho inteiro.
pub fn decode_all<T: DeserializeOwned>(label: &str, documents: Vec<Document>) -> Vec<Record<T>> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match Record::from_document(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Documento {} de {} ignorado: {}", id, label, e);
                    None
                }
            }
        })
        .collect()
}
