//! Axum route handlers for the Résumé API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::ingest::{DocumentFormat, DocumentIngestor, ExtractedText, UploadedDocument, PREVIEW_CHARS};
use crate::resume::models::{ExtractionOutcome, ParsedResume};
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const RAW_REPLY_MESSAGE: &str = "The model returned non-JSON text. Here's the raw output.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub filename: String,
    pub format: DocumentFormat,
    pub char_count: usize,
    pub text: String,
    pub preview: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ParseResponse {
    Parsed { resume: ParsedResume },
    Raw { raw_reply: String, message: String },
}

impl From<ExtractionOutcome> for ParseResponse {
    fn from(outcome: ExtractionOutcome) -> Self {
        match outcome {
            Ok(resume) => ParseResponse::Parsed { resume },
            Err(raw) => ParseResponse::Raw {
                raw_reply: raw.as_str().to_string(),
                message: RAW_REPLY_MESSAGE.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadAndParseResponse {
    pub filename: String,
    pub preview: String,
    #[serde(flatten)]
    pub result: ParseResponse,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resume/formats
pub async fn handle_formats() -> Json<Value> {
    let extensions: Vec<&str> = DocumentFormat::ALL.iter().map(|f| f.extension()).collect();
    Json(json!({ "extensions": extensions }))
}

/// POST /api/v1/resume/ingest
///
/// Extracts the text of an uploaded file and returns it with a short preview.
/// Does not call the model.
pub async fn handle_ingest(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let document = read_upload(multipart).await?;
    let filename = document.filename.clone();
    let (format, text) = ingest_blocking(state.ingestor.clone(), document).await?;

    Ok(Json(IngestResponse {
        filename,
        format,
        char_count: text.char_count(),
        preview: text.preview(PREVIEW_CHARS).to_string(),
        text: text.into_string(),
    }))
}

/// POST /api/v1/resume/parse
///
/// Sends previously extracted text to the model once.
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, AppError> {
    let outcome = state.extraction.build_and_send(&request.text).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/resume
///
/// Ingest and parse in one request. Documents with no extractable text stop
/// before the model is called.
pub async fn handle_upload_and_parse(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadAndParseResponse>, AppError> {
    let document = read_upload(multipart).await?;
    let filename = document.filename.clone();
    let (_, text) = ingest_blocking(state.ingestor.clone(), document).await?;
    if text.is_empty() {
        return Err(AppError::NothingToParse);
    }

    let outcome = state.extraction.build_and_send(text.as_str()).await?;

    Ok(Json(UploadAndParseResponse {
        filename,
        preview: text.preview(PREVIEW_CHARS).to_string(),
        result: outcome.into(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Pulls the `file` field out of a multipart body. Other fields are drained and ignored.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            field.bytes().await?;
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let content = field.bytes().await?;

        return Ok(UploadedDocument { filename, content });
    }

    Err(AppError::Validation(format!(
        "Missing '{FILE_FIELD}' field in multipart body"
    )))
}

/// Extraction libraries are synchronous; keep them off the async workers.
async fn ingest_blocking(
    ingestor: Arc<DocumentIngestor>,
    document: UploadedDocument,
) -> Result<(DocumentFormat, ExtractedText), AppError> {
    let ingested = tokio::task::spawn_blocking(move || ingestor.ingest_document(&document))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(ingested)
}
