use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::users::validation::FieldError;

/// Error returned by handlers. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body or path could not be decoded (400)
    #[error("{0}")]
    BadRequest(String),

    /// Input decoded but failed validation (400)
    #[error("{}", first_message(.0))]
    Validation(Vec<FieldError>),

    /// No live row with the requested id (404)
    #[error("record not found")]
    NotFound,

    /// Storage failure (500, logged)
    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),
}

fn first_message(errors: &[FieldError]) -> &str {
    errors
        .first()
        .map(|e| e.message.as_str())
        .unwrap_or("invalid input")
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string() }),
            ),
            Self::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "fields": fields }),
            ),
            Self::Database(e) => {
                tracing::error!(error = %format!("{e:#}"), "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_json(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "record not found");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn validation_is_400_with_first_message_and_fields() {
        let err = ApiError::Validation(vec![
            FieldError {
                field: "name",
                message: "Name should be more than 1 char".into(),
            },
            FieldError {
                field: "address",
                message: "Address should be more than 1 char".into(),
            },
        ]);
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name should be more than 1 char");
        assert_eq!(body["fields"][1]["field"], "address");
    }

    #[tokio::test]
    async fn database_error_hides_details() {
        let (status, body) = body_json(ApiError::from(anyhow::anyhow!("connection refused"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }
}
