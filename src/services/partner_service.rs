// src/services/partner_service.rs
//
// Parceiros (fornecedores, financeiras, seguradoras) e membros da equipa.

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{paths::Scope, PartnersRepository},
    models::{
        partners::{MemberState, Partner, PartnerKind, TeamMember},
        record::Record,
    },
};

#[derive(Clone)]
pub struct PartnerService {
    repo: PartnersRepository,
}

impl PartnerService {
    pub fn new(repo: PartnersRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  PARCEIROS
    // =========================================================================

    /// O tipo vem da secção onde o parceiro é gravado, não do formulário.
    pub async fn save_partner(
        &self,
        scope: &Scope,
        kind: PartnerKind,
        id: Option<&str>,
        mut partner: Partner,
    ) -> Result<String, AppError> {
        partner.validate()?;
        partner.kind = Some(kind);

        match id {
            Some(id) => {
                if self.repo.find_partner(scope, id).await?.is_none() {
                    return Err(AppError::NotFound("Parceiro".into()));
                }
                self.repo.replace_partner(scope, id, &partner).await?;
                tracing::info!("{} {} atualizado", kind.as_str(), id);
                Ok(id.to_string())
            }
            None => {
                let id = self.repo.insert_partner(scope, &partner).await?;
                tracing::info!("{} {} criado", kind.as_str(), id);
                Ok(id)
            }
        }
    }

    pub async fn list_partners(
        &self,
        scope: &Scope,
        kind: Option<PartnerKind>,
    ) -> Result<Vec<Record<Partner>>, AppError> {
        self.repo.list_partners(scope, kind).await
    }

    pub async fn delete_partner(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.repo.delete_partner(scope, id).await?;
        tracing::info!("Parceiro {} apagado", id);
        Ok(())
    }

    // =========================================================================
    //  EQUIPA
    // =========================================================================

    /// O nome mostrado é sempre "primeiro último". Membros novos entram ativos.
    pub async fn save_member(
        &self,
        scope: &Scope,
        id: Option<&str>,
        mut member: TeamMember,
    ) -> Result<String, AppError> {
        member.validate()?;
        member.name = member.full_name();

        match id {
            Some(id) => {
                if self.repo.find_member(scope, id).await?.is_none() {
                    return Err(AppError::NotFound("Membro da equipa".into()));
                }
                self.repo.replace_member(scope, id, &member).await?;
                tracing::info!("Membro {} atualizado", id);
                Ok(id.to_string())
            }
            None => {
                member.state = MemberState::Active;
                let id = self.repo.insert_member(scope, &member).await?;
                tracing::info!("Membro {} ({}) criado", id, member.name);
                Ok(id)
            }
        }
    }

    /// Ativo <-> Inativo. Devolve o novo estado.
    pub async fn toggle_member(&self, scope: &Scope, id: &str) -> Result<MemberState, AppError> {
        let member = self
            .repo
            .find_member(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membro da equipa".into()))?;

        let next = member.data.state.toggled();
        self.repo.set_member_state(scope, id, next).await?;
        tracing::info!("Membro {} passou a {}", id, next.as_str());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{memory_store::MemoryStore, store::DocumentStore};

    fn fixture() -> (PartnerService, PartnersRepository, Scope) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let repo = PartnersRepository::new(store);
        (PartnerService::new(repo.clone()), repo, Scope::new("gestao", "u1"))
    }

    #[tokio::test]
    async fn partners_take_the_kind_of_their_section() {
        let (service, _repo, scope) = fixture();
        let partner = Partner {
            name: "Auto Lda".into(),
            kind: Some(PartnerKind::Insurer),
            ..Default::default()
        };
        service
            .save_partner(&scope, PartnerKind::Supplier, None, partner)
            .await
            .unwrap();

        let suppliers = service.list_partners(&scope, Some(PartnerKind::Supplier)).await.unwrap();
        assert_eq!(suppliers.len(), 1);
        assert!(service
            .list_partners(&scope, Some(PartnerKind::Insurer))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn new_members_start_active_and_toggle() {
        let (service, repo, scope) = fixture();
        let member = TeamMember {
            first_name: "Rui".into(),
            last_name: "Costa".into(),
            state: MemberState::Inactive,
            ..Default::default()
        };
        let id = service.save_member(&scope, None, member).await.unwrap();

        let saved = repo.find_member(&scope, &id).await.unwrap().unwrap();
        assert_eq!(saved.data.name, "Rui Costa");
        assert_eq!(saved.data.state, MemberState::Active);

        assert_eq!(service.toggle_member(&scope, &id).await.unwrap(), MemberState::Inactive);
        assert_eq!(service.toggle_member(&scope, &id).await.unwrap(), MemberState::Active);
    }
}
