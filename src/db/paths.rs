// src/db/paths.rs

use std::fmt;

use crate::common::error::AppError;

/// Coleções lógicas da aplicação e o seu nome no armazenamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Contracts,
    Tasks,
    Expenses,
    BankAccounts,
    // Partilhadas entre todas as sessões
    Partners,
    TeamMembers,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Clients => "clientes",
            Collection::Contracts => "contratos",
            Collection::Tasks => "tarefas",
            Collection::Expenses => "despesas",
            Collection::BankAccounts => "contasBancarias",
            Collection::Partners => "parceiros",
            Collection::TeamMembers => "utilizadores",
        }
    }

    pub fn is_shared(self) -> bool {
        matches!(self, Collection::Partners | Collection::TeamMembers)
    }
}

/// Dono de uma sub-coleção (interações e documentos).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOwner {
    Client(String),
    Contract(String),
}

impl RecordOwner {
    pub fn id(&self) -> &str {
        match self {
            RecordOwner::Client(id) | RecordOwner::Contract(id) => id,
        }
    }

    /// Coleção onde vive o dono.
    pub fn parent(&self) -> Collection {
        match self {
            RecordOwner::Client(_) => Collection::Clients,
            RecordOwner::Contract(_) => Collection::Contracts,
        }
    }

    /// Categoria usada no armazenamento de ficheiros: `{categoria}/{ownerId}/{ficheiro}`.
    pub fn blob_category(&self) -> &'static str {
        match self {
            RecordOwner::Client(_) => "documentos_clientes",
            RecordOwner::Contract(_) => "documentos_contratos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCollection {
    Interactions,
    Documents,
}

impl SubCollection {
    fn name(self) -> &'static str {
        match self {
            SubCollection::Interactions => "interacoes",
            SubCollection::Documents => "documentos",
        }
    }
}

/// Caminho hierárquico completo de uma coleção, ex: `gestao/users/{uid}/clientes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Âmbito de uma sessão: o namespace fixo da instalação + o utilizador autenticado.
/// É passado explicitamente a cada repositório; não existe contexto global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub namespace: String,
    pub user_id: String,
}

impl Scope {
    pub fn new(namespace: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            user_id: user_id.into(),
        }
    }

    pub fn collection(&self, collection: Collection) -> CollectionPath {
        if collection.is_shared() {
            CollectionPath(format!("{}/public/data/{}", self.namespace, collection.name()))
        } else {
            CollectionPath(format!(
                "{}/users/{}/{}",
                self.namespace,
                self.user_id,
                collection.name()
            ))
        }
    }

    pub fn sub_collection(
        &self,
        owner: &RecordOwner,
        sub: SubCollection,
    ) -> Result<CollectionPath, AppError> {
        let parent = self.collection(owner.parent());
        let owner_id = segment(owner.id())?;
        Ok(CollectionPath(format!("{}/{}/{}", parent, owner_id, sub.name())))
    }
}

/// Garante que um id vindo de fora não escapa do seu caminho.
pub fn segment(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains('/') || trimmed == "." || trimmed == ".." {
        return Err(AppError::invalid(format!("Identificador inválido: '{}'", id)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_and_shared_paths() {
        let scope = Scope::new("gestao", "u1");
        assert_eq!(scope.collection(Collection::Clients).as_str(), "gestao/users/u1/clientes");
        assert_eq!(
            scope.collection(Collection::BankAccounts).as_str(),
            "gestao/users/u1/contasBancarias"
        );
        assert_eq!(
            scope.collection(Collection::Partners).as_str(),
            "gestao/public/data/parceiros"
        );
        assert_eq!(
            scope.collection(Collection::TeamMembers).as_str(),
            "gestao/public/data/utilizadores"
        );
    }

    #[test]
    fn sub_collections_live_under_their_owner() {
        let scope = Scope::new("gestao", "u1");
        let path = scope
            .sub_collection(&RecordOwner::Contract("c9".into()), SubCollection::Interactions)
            .unwrap();
        assert_eq!(path.as_str(), "gestao/users/u1/contratos/c9/interacoes");
    }

    #[test]
    fn ids_with_slashes_are_rejected() {
        let scope = Scope::new("gestao", "u1");
        let err = scope.sub_collection(&RecordOwner::Client("../x".into()), SubCollection::Documents);
        assert!(matches!(err, Err(AppError::InvalidInput(_))));
    }
}
