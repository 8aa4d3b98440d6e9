// src/db/blob_store.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

/// Armazenamento de ficheiros: grava bytes num caminho e devolve um URL de download.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, AppError>;

    async fn download(&self, path: &str) -> Result<Vec<u8>, AppError>;
}

/// Implementação em disco local. Os URLs apontam para a rota `GET {public_url}/{path}`.
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        // Só aceitamos componentes normais: nada de "..", raízes ou prefixos.
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.trim().is_empty() {
            return Err(AppError::invalid(format!("Caminho de ficheiro inválido: '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::info!("📎 Ficheiro guardado em {}", target.display());
        Ok(format!("{}/{}", self.public_url, path))
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, AppError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Ficheiro {}", path)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn upload_returns_url_and_bytes_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files/");

        let url = store
            .upload("documentos_clientes/c1/cc.pdf", b"%PDF".to_vec())
            .await
            .unwrap();
        assert_eq!(url, "/files/documentos_clientes/c1/cc.pdf");

        let bytes = store.download("documentos_clientes/c1/cc.pdf").await.unwrap();
        assert_eq!(bytes, b"%PDF");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files");

        let result = store.upload("../fora.txt", vec![1]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files");
        let result = store.download("nada/aqui.pdf").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
