// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    db::Scope,
    models::auth::SessionUser,
};

// O EventSource do browser não envia cabeçalhos: nas vistas ao vivo o token vem na query
const TOKEN_QUERY_PARAM: &str = "access_token";

fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(token) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    parts.uri.query().and_then(|query| {
        query.split('&').find_map(|pair| {
            pair.strip_prefix(TOKEN_QUERY_PARAM)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
    })
}

/// Valida o token da sessão e coloca o `SessionUser` nas extensions do pedido.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let token = bearer_token(&parts).ok_or(AppError::InvalidToken)?;
    let user = app_state.session_service.validate_token(&token)?;

    parts.extensions.insert(user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

// Extrator para obter o utilizador autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

/// Âmbito de dados do utilizador autenticado.
pub struct SessionScope(pub Scope);

impl FromRequestParts<AppState> for SessionScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;
        Ok(SessionScope(state.scope(&user.user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(uri: &str, header: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn token_comes_from_header_or_query() {
        assert_eq!(bearer_token(&parts("/api/x", Some("Bearer abc"))), Some("abc".into()));
        assert_eq!(bearer_token(&parts("/api/live/x?a=1&access_token=xyz", None)), Some("xyz".into()));
        assert_eq!(bearer_token(&parts("/api/x", Some("Basic abc"))), None);
    }
}
