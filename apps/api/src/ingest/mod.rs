//! Document ingestion — turns an uploaded résumé file into one flat text string.
//!
//! The loader is chosen by filename suffix (case-sensitive `.pdf`, `.docx`, `.txt`).
//! Uploaded bytes are written to a scratch file for the duration of one call so the
//! extraction libraries can work from a path; the file is gone again when `ingest`
//! returns, whatever the outcome.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod loaders;

use loaders::{DocxLoader, PdfLoader, TxtLoader};

/// Number of characters shown back to the caller as a preview of extracted text.
pub const PREVIEW_CHARS: usize = 4000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format for '{filename}'. Please upload a PDF, DOCX, or TXT file.")]
    UnsupportedFormat { filename: String },

    #[error("Could not decode text file as UTF-8: {0}")]
    DecodeFailure(String),

    #[error("Failed to extract text from {format} document: {message}")]
    Extraction {
        format: DocumentFormat,
        message: String,
    },

    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [DocumentFormat::Pdf, DocumentFormat::Docx, DocumentFormat::Txt];

    /// Picks a format from the filename's suffix. Exact, case-sensitive match.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| filename.ends_with(format.extension()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
            DocumentFormat::Txt => ".txt",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Txt => "TXT",
        };
        f.write_str(name)
    }
}

/// One page, paragraph, or whole file worth of text produced by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment(pub String);

impl TextSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An upload as received from the client. Consumed by a single `ingest` call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content: bytes::Bytes,
}

/// Flattened text of a whole document. Segment boundaries are not preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn from_segments(segments: &[TextSegment]) -> Self {
        Self(
            segments
                .iter()
                .map(TextSegment::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True when there is nothing worth sending to the model.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// First `max_chars` characters, never splitting a UTF-8 sequence.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

/// Adapter over a text-extraction library. Reads the file at `path` and returns
/// its text segments in document order.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<TextSegment>, IngestError>;
}

/// Selects a loader per upload and runs it against a short-lived scratch file.
pub struct DocumentIngestor {
    scratch_dir: PathBuf,
    loaders: HashMap<DocumentFormat, Arc<dyn DocumentLoader>>,
}

impl DocumentIngestor {
    /// Ingestor with the production PDF, DOCX and TXT loaders.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self::empty(scratch_dir)
            .with_loader(DocumentFormat::Pdf, Arc::new(PdfLoader))
            .with_loader(DocumentFormat::Docx, Arc::new(DocxLoader))
            .with_loader(DocumentFormat::Txt, Arc::new(TxtLoader))
    }

    fn empty(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            loaders: HashMap::new(),
        }
    }

    /// Replaces the loader used for `format`.
    pub fn with_loader(mut self, format: DocumentFormat, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loaders.insert(format, loader);
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Extracts the text of one uploaded document.
    ///
    /// Unsupported suffixes are rejected before anything touches the filesystem.
    /// An empty result is a success; callers decide whether to go further.
    pub fn ingest(&self, filename: &str, content: &[u8]) -> Result<ExtractedText, IngestError> {
        self.ingest_with_format(filename, content).map(|(_, text)| text)
    }

    /// Like [`ingest`](Self::ingest), also returning the format the file was dispatched as.
    pub fn ingest_with_format(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<(DocumentFormat, ExtractedText), IngestError> {
        let format = DocumentFormat::from_filename(filename).ok_or_else(|| {
            IngestError::UnsupportedFormat {
                filename: filename.to_string(),
            }
        })?;
        let loader = self
            .loaders
            .get(&format)
            .ok_or_else(|| IngestError::UnsupportedFormat {
                filename: filename.to_string(),
            })?;

        let mut scratch = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(format.extension())
            .tempfile_in(&self.scratch_dir)?;
        scratch.write_all(content)?;
        scratch.flush()?;
        debug!("Wrote {} bytes to {:?}", content.len(), scratch.path());

        let result = loader.load(scratch.path());

        // Dropping also deletes, but close() lets us see a failed removal.
        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch file for '{filename}': {e}");
        }

        let segments = result?;
        let text = ExtractedText::from_segments(&segments);
        info!(
            "Ingested '{}' ({}): {} segments, {} chars",
            filename,
            format,
            segments.len(),
            text.char_count()
        );
        Ok((format, text))
    }

    pub fn ingest_document(
        &self,
        document: &UploadedDocument,
    ) -> Result<(DocumentFormat, ExtractedText), IngestError> {
        self.ingest_with_format(&document.filename, &document.content)
    }
}
