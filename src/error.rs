// src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Spam detected")]
    Spam,

    #[error("Too many requests. Please wait a moment before trying again.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Mail delivery failed: {0}")]
    Mail(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Spam => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Mail(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unreadable request bodies are a client mistake like any other validation
/// failure: 400 with the usual JSON error shape, no serde detail in the reply.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            status = %rejection.status(),
            detail = %rejection.body_text(),
            "json body rejected"
        );
        let msg = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            _ => "Invalid request body",
        };
        AppError::Validation(msg.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Mail(e) => {
                tracing::error!(error = ?e, "contact mail delivery failed");
                "Failed to send message. Please try again later.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                "Internal server error. Please try again later.".to_string()
            }
            other => other.to_string(),
        };

        let mut resp = (status, Json(json!({ "error": message }))).into_response();
        if let AppError::RateLimited { retry_after_secs } = self {
            if let Ok(v) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                resp.headers_mut().insert(header::RETRY_AFTER, v);
            }
        }
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::Spam.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Validation("Name is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RateLimited { retry_after_secs: 5 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Mail(anyhow::anyhow!("smtp down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rate_limited_response_carries_retry_after() {
        let resp = AppError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            resp.headers().get(header::RETRY_AFTER).unwrap(),
            &HeaderValue::from_static("42")
        );
    }
}
