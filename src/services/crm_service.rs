// src/services/crm_service.rs

use std::sync::Arc;

use chrono::{Local, Utc};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{
        blob_store::BlobStore,
        paths::{segment, RecordOwner, Scope},
        CrmRepository,
    },
    models::{
        crm::{AttachedDocument, Client, Interaction, InteractionKind, NotePayload},
        record::Record,
    },
};

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    blobs: Arc<dyn BlobStore>,
}

impl CrmService {
    pub fn new(repo: CrmRepository, blobs: Arc<dyn BlobStore>) -> Self {
        Self { repo, blobs }
    }

    // =========================================================================
    //  1. CLIENTES
    // =========================================================================

    /// Cria (`id = None`) ou substitui um cliente.
    ///
    /// O NIF é único por sessão: a verificação é uma leitura antes da escrita, por isso
    /// duas sessões a gravar o mesmo NIF ao mesmo tempo ainda podem passar as duas.
    pub async fn save_client(
        &self,
        scope: &Scope,
        id: Option<&str>,
        mut client: Client,
    ) -> Result<String, AppError> {
        client.validate()?;

        if let Some(nif) = client.nif_key() {
            let holders = self.repo.find_clients_by_nif(scope, nif).await?;
            if holders.iter().any(|holder| Some(holder.id.as_str()) != id) {
                tracing::warn!("NIF {} recusado: já pertence a outro cliente", nif);
                return Err(AppError::DuplicateNif(nif.to_string()));
            }
        }

        match id {
            Some(id) => {
                if self.repo.find_client(scope, id).await?.is_none() {
                    return Err(AppError::NotFound("Cliente".into()));
                }
                self.repo.replace_client(scope, id, &client).await?;
                tracing::info!("Cliente {} atualizado", id);
                Ok(id.to_string())
            }
            None => {
                if client.created_on.is_none() {
                    client.created_on = Some(Local::now().date_naive().format("%Y-%m-%d").to_string());
                }
                let id = self.repo.insert_client(scope, &client).await?;
                tracing::info!("Cliente {} criado", id);
                Ok(id)
            }
        }
    }

    pub async fn get_client(&self, scope: &Scope, id: &str) -> Result<Record<Client>, AppError> {
        self.repo
            .find_client(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente".into()))
    }

    pub async fn delete_client(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.repo.delete_client(scope, id).await?;
        tracing::info!("Cliente {} apagado", id);
        Ok(())
    }

    async fn ensure_owner(&self, scope: &Scope, owner: &RecordOwner) -> Result<(), AppError> {
        if self.repo.owner_exists(scope, owner).await? {
            return Ok(());
        }
        Err(AppError::NotFound(match owner {
            RecordOwner::Client(_) => "Cliente".into(),
            RecordOwner::Contract(_) => "Contrato".into(),
        }))
    }

    // =========================================================================
    //  2. HISTÓRICO (notas manuais)
    // =========================================================================

    pub async fn add_note(
        &self,
        scope: &Scope,
        owner: &RecordOwner,
        note: NotePayload,
    ) -> Result<String, AppError> {
        note.validate()?;
        let description = note.description.trim();
        if description.is_empty() {
            return Err(AppError::invalid("A nota não pode estar vazia."));
        }
        self.ensure_owner(scope, owner).await?;

        let interaction = Interaction {
            occurred_at: Utc::now().to_rfc3339(),
            kind: Some(InteractionKind::ManualNote),
            description: description.to_string(),
        };
        self.repo.append_interaction(scope, owner, &interaction).await
    }

    // =========================================================================
    //  3. DOCUMENTOS
    // =========================================================================

    /// Guarda o ficheiro em `{categoria}/{ownerId}/{nome}` e regista-o na lista de documentos.
    pub async fn upload_document(
        &self,
        scope: &Scope,
        owner: &RecordOwner,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Record<AttachedDocument>, AppError> {
        let file_name = file_name.trim();
        if file_name.is_empty() || bytes.is_empty() {
            return Err(AppError::invalid("Escolha um ficheiro para carregar."));
        }
        self.ensure_owner(scope, owner).await?;

        let path = format!(
            "{}/{}/{}",
            owner.blob_category(),
            segment(owner.id())?,
            segment(file_name)?
        );
        let url = self.blobs.upload(&path, bytes).await?;

        let document = AttachedDocument {
            name: file_name.to_string(),
            url,
            uploaded_at: Utc::now().to_rfc3339(),
        };
        let id = self.repo.add_document(scope, owner, &document).await?;
        tracing::info!("Documento {} carregado em {}", file_name, path);
        Ok(Record { id, data: document })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        blob_store::LocalBlobStore,
        memory_store::MemoryStore,
        store::DocumentStore,
        ContractsRepository,
    };
    use crate::models::contracts::Contract;

    fn service(dir: &std::path::Path) -> (CrmService, CrmRepository, Scope) {
        let (service, repo, _store, scope) = service_with_store(dir);
        (service, repo, scope)
    }

    fn service_with_store(dir: &std::path::Path) -> (CrmService, CrmRepository, Arc<dyn DocumentStore>, Scope) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let repo = CrmRepository::new(store.clone());
        let blobs = Arc::new(LocalBlobStore::new(dir, "/files"));
        (CrmService::new(repo.clone(), blobs), repo, store, Scope::new("gestao", "u1"))
    }

    fn client(name: &str, nif: &str) -> Client {
        Client {
            name: name.into(),
            nif: Some(nif.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn second_client_with_the_same_nif_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo, scope) = service(dir.path());

        service.save_client(&scope, None, client("Ana", "123456789")).await.unwrap();
        let err = service
            .save_client(&scope, None, client("Bruno", "123456789"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateNif(_)));
        assert_eq!(repo.find_clients_by_nif(&scope, "123456789").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_client_may_keep_its_own_nif() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo, scope) = service(dir.path());

        let id = service.save_client(&scope, None, client("Ana", "123456789")).await.unwrap();
        service
            .save_client(&scope, Some(&id), client("Ana Maria", "123456789"))
            .await
            .unwrap();

        let saved = repo.find_client(&scope, &id).await.unwrap().unwrap();
        assert_eq!(saved.data.name, "Ana Maria");
    }

    #[tokio::test]
    async fn invalid_nif_never_reaches_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo, scope) = service(dir.path());

        let err = service.save_client(&scope, None, client("Ana", "12")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(repo.find_clients_by_nif(&scope, "12").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_notes_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo, scope) = service(dir.path());
        let id = service.save_client(&scope, None, client("Ana", "123456789")).await.unwrap();
        let owner = RecordOwner::Client(id);

        let blank = NotePayload { description: "   ".into() };
        assert!(service.add_note(&scope, &owner, blank).await.is_err());

        let note = NotePayload { description: "Ligou a pedir simulação".into() };
        service.add_note(&scope, &owner, note).await.unwrap();

        let history = repo.list_interactions(&scope, &owner).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].data.kind, Some(InteractionKind::ManualNote));
    }

    #[tokio::test]
    async fn uploads_land_under_the_owner_folder() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _repo, store, scope) = service_with_store(dir.path());
        let contracts = ContractsRepository::new(store);
        let contract = Contract { client_id: "cli1".into(), ..Default::default() };
        let id = contracts.insert(&scope, &contract).await.unwrap();
        let owner = RecordOwner::Contract(id.clone());

        let doc = service
            .upload_document(&scope, &owner, "cc.pdf", b"%PDF".to_vec())
            .await
            .unwrap();

        assert_eq!(doc.data.name, "cc.pdf");
        let path = format!("documentos_contratos/{}/cc.pdf", id);
        assert!(doc.data.url.ends_with(&path));
        assert!(dir.path().join(&path).exists());
    }

    #[tokio::test]
    async fn notes_and_uploads_need_an_existing_owner() {
        let dir = tempfile::tempdir().unwrap();
        let (service, repo, scope) = service(dir.path());
        let ghost_client = RecordOwner::Client("fantasma".into());
        let ghost_contract = RecordOwner::Contract("fantasma".into());

        let note = NotePayload { description: "Ligou".into() };
        let err = service.add_note(&scope, &ghost_client, note).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.list_interactions(&scope, &ghost_client).await.unwrap().is_empty());

        let err = service
            .upload_document(&scope, &ghost_contract, "cc.pdf", b"%PDF".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!dir.path().join("documentos_contratos/fantasma/cc.pdf").exists());
    }
}
