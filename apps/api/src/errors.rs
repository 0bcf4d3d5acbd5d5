use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::llm_client::LlmError;
use crate::resume::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Nothing to parse: the document contains no extractable text")]
    NothingToParse,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::EmptyText => AppError::NothingToParse,
            ExtractionError::Llm(e) => AppError::Llm(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Uploaded file exceeds the maximum upload size".to_string(),
            ),
            AppError::Multipart(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid multipart body: {}", e.body_text()),
            ),
            AppError::Ingest(e @ IngestError::UnsupportedFormat { .. }) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                e.to_string(),
            ),
            AppError::Ingest(e @ IngestError::DecodeFailure(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_FAILURE", e.to_string())
            }
            AppError::Ingest(e @ IngestError::Extraction { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                e.to_string(),
            ),
            AppError::Ingest(IngestError::Io(e)) => {
                tracing::error!("Scratch file error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "Failed to store the uploaded file".to_string(),
                )
            }
            AppError::NothingToParse => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOTHING_TO_PARSE",
                self.to_string(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The language model request failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn status_and_code(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = response_json(response).await;
        (status, body["error"]["code"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_ingest_errors_map_to_client_statuses() {
        let unsupported = IngestError::UnsupportedFormat {
            filename: "cv.rtf".to_string(),
        };
        assert_eq!(
            status_and_code(unsupported.into()).await,
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT".to_string())
        );
        assert_eq!(
            status_and_code(IngestError::DecodeFailure("invalid utf-8".to_string()).into()).await,
            (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_FAILURE".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_text_maps_to_nothing_to_parse() {
        assert_eq!(
            status_and_code(ExtractionError::EmptyText.into()).await,
            (StatusCode::UNPROCESSABLE_ENTITY, "NOTHING_TO_PARSE".to_string())
        );
    }

    #[tokio::test]
    async fn test_llm_errors_hide_details() {
        let err: AppError = ExtractionError::Llm(LlmError::EmptyContent).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response_json(response).await;
        assert_eq!(body["error"]["message"], "The language model request failed");
    }
}
