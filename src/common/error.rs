// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros de campo que não vêm do `validator` (ex: cliente inexistente)
    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    #[error("O NIF {0} já existe")]
    DuplicateNif(String),

    #[error("Não encontrado: {0}")]
    NotFound(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // O backend de dados (subscrição, leitura ou escrita) falhou
    #[error("Serviço de dados indisponível: {0}")]
    BackendUnavailable(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro de ficheiro: {0}")]
    IoError(#[from] std::io::Error),

    // As fontes do gerador de PDF não foram carregadas
    #[error("Gerador de PDF indisponível: {0}")]
    PdfUnavailable(String),

    #[error("Erro ao gerar PDF: {0}")]
    PdfRenderError(String),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Atalho para erros de validação simples (um único campo).
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DuplicateNif(_) => (StatusCode::CONFLICT, "Erro: O NIF introduzido já existe."),
            AppError::NotFound(what) => {
                let body = Json(json!({ "error": format!("{} não encontrado.", what) }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::InvalidToken | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "Token de sessão inválido ou ausente.")
            }
            AppError::BackendUnavailable(ref e) => {
                tracing::error!("Backend de dados indisponível: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "O serviço de dados está indisponível. Tente novamente.")
            }
            AppError::PdfUnavailable(ref e) => {
                tracing::error!("Gerador de PDF indisponível: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Erro ao gerar PDF. A biblioteca não foi carregada corretamente.",
                )
            }

            // Todos os outros erros viram 500; o `tracing` regista a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
