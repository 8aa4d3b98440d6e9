// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, SessionResponse, SessionUser},
};

/// Validade dos tokens de sessão.
const SESSION_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SessionService {
    jwt_secret: String,
}

impl SessionService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Entrada anónima: cada chamada gera um utilizador novo.
    pub fn sign_in_anonymously(&self) -> Result<SessionResponse, AppError> {
        let user_id = Uuid::new_v4().to_string();
        tracing::info!("🔑 Nova sessão anónima {}", user_id);
        self.session_for(user_id)
    }

    /// Entrada com token próprio: o token tem de ser válido e a identidade mantém-se.
    pub fn sign_in_with_token(&self, token: &str) -> Result<SessionResponse, AppError> {
        let user = self.validate_token(token)?;
        tracing::info!("🔑 Sessão renovada para {}", user.user_id);
        self.session_for(user.user_id)
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }
        Ok(SessionUser { user_id: token_data.claims.sub })
    }

    fn session_for(&self, user_id: String) -> Result<SessionResponse, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(SESSION_DAYS);

        let claims = Claims {
            sub: user_id.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;
        Ok(SessionResponse { token, user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_token_keeps_the_user() {
        let service = SessionService::new("segredo".into());
        let first = service.sign_in_anonymously().unwrap();
        let again = service.sign_in_with_token(&first.token).unwrap();
        assert_eq!(again.user_id, first.user_id);
        assert_eq!(service.validate_token(&again.token).unwrap().user_id, first.user_id);
    }

    #[test]
    fn anonymous_sessions_are_distinct() {
        let service = SessionService::new("segredo".into());
        let a = service.sign_in_anonymously().unwrap();
        let b = service.sign_in_anonymously().unwrap();
        assert_ne!(a.user_id, b.user_id);
    }

    #[test]
    fn foreign_tokens_are_rejected() {
        let ours = SessionService::new("segredo".into());
        let theirs = SessionService::new("outro".into());
        let token = theirs.sign_in_anonymously().unwrap().token;
        assert!(matches!(ours.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(ours.validate_token("lixo").is_err());
    }
}
