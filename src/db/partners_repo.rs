// src/db/partners_repo.rs
//
// Parceiros e equipa vivem no espaço partilhado: são os mesmos para todas as sessões.

use std::sync::Arc;

use serde_json::json;

use crate::{
    common::error::AppError,
    db::{
        paths::{Collection, Scope},
        records::{get_record, get_records},
        store::{to_fields, DocumentStore, Fields, Query},
    },
    models::{
        partners::{MemberState, Partner, PartnerKind, TeamMember},
        record::Record,
    },
};

#[derive(Clone)]
pub struct PartnersRepository {
    store: Arc<dyn DocumentStore>,
}

impl PartnersRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    //  PARCEIROS
    // =========================================================================

    pub fn partners_query(&self, scope: &Scope, kind: Option<PartnerKind>) -> Query {
        let query = Query::all(scope.collection(Collection::Partners));
        match kind {
            Some(kind) => query.where_eq("tipo", kind.as_str()),
            None => query,
        }
    }

    pub async fn list_partners(
        &self,
        scope: &Scope,
        kind: Option<PartnerKind>,
    ) -> Result<Vec<Record<Partner>>, AppError> {
        get_records(self.store.as_ref(), &self.partners_query(scope, kind)).await
    }

    pub async fn find_partner(
        &self,
        scope: &Scope,
        id: &str,
    ) -> Result<Option<Record<Partner>>, AppError> {
        get_record(self.store.as_ref(), &scope.collection(Collection::Partners), id).await
    }

    pub async fn insert_partner(&self, scope: &Scope, partner: &Partner) -> Result<String, AppError> {
        self.store
            .insert(&scope.collection(Collection::Partners), to_fields(partner)?)
            .await
    }

    pub async fn replace_partner(
        &self,
        scope: &Scope,
        id: &str,
        partner: &Partner,
    ) -> Result<(), AppError> {
        self.store
            .set(&scope.collection(Collection::Partners), id, to_fields(partner)?)
            .await
    }

    pub async fn delete_partner(&self, scope: &Scope, id: &str) -> Result<(), AppError> {
        self.store
            .delete(&scope.collection(Collection::Partners), id)
            .await
    }

    // =========================================================================
    //  EQUIPA
    // =========================================================================

    pub fn team_query(&self, scope: &Scope, active_only: bool) -> Query {
        let query = Query::all(scope.collection(Collection::TeamMembers));
        if active_only {
            query.where_eq("estado", MemberState::Active.as_str())
        } else {
            query
        }
    }

    pub async fn find_member(
        &self,
        scope: &Scope,
        id: &str,
    ) -> Result<Option<Record<TeamMember>>, AppError> {
        get_record(self.store.as_ref(), &scope.collection(Collection::TeamMembers), id).await
    }

    pub async fn insert_member(&self, scope: &Scope, member: &TeamMember) -> Result<String, AppError> {
        self.store
            .insert(&scope.collection(Collection::TeamMembers), to_fields(member)?)
            .await
    }

    pub async fn replace_member(
        &self,
        scope: &Scope,
        id: &str,
        member: &TeamMember,
    ) -> Result<(), AppError> {
        self.store
            .set(&scope.collection(Collection::TeamMembers), id, to_fields(member)?)
            .await
    }

    /// "Apagar" um membro é desativá-lo: só o estado muda.
    pub async fn set_member_state(
        &self,
        scope: &Scope,
        id: &str,
        state: MemberState,
    ) -> Result<(), AppError> {
        let mut fields = Fields::new();
        fields.insert("estado".to_string(), json!(state.as_str()));
        self.store
            .update(&scope.collection(Collection::TeamMembers), id, fields)
            .await
    }
}
