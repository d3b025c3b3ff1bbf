use axum::extract::multipart::MultipartError;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use pdf_tables::{CombineError, ExtractError, WriteError};
use thiserror::Error;

/// Every way an upload request can fail.
///
/// Client mistakes render as fixed 400 messages; anything that goes wrong
/// after the file was accepted renders as `Error processing file: ...`.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type. Only PDFs are allowed.")]
    UnsupportedType { filename: String },

    #[error("No tables found in the PDF.")]
    NoTablesFound,

    #[error("Error processing file: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Error processing file: {0}")]
    Extraction(ExtractError),

    #[error("Error processing file: {0}")]
    Combine(#[from] CombineError),

    #[error("Error processing file: {0}")]
    Serialize(#[from] WriteError),

    #[error("Error processing file: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Error processing file: {0}")]
    Processing(String),
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::EmptyFilename => "empty_filename",
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::NoTablesFound => "no_tables",
            Self::Multipart(_) => "multipart_error",
            Self::Extraction(_) => "extraction_error",
            Self::Combine(_) => "combine_error",
            Self::Serialize(_) => "serialize_error",
            Self::Persist(_) => "storage_error",
            Self::Processing(_) => "processing_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFile
            | Self::EmptyFilename
            | Self::UnsupportedType { .. }
            | Self::NoTablesFound => StatusCode::BAD_REQUEST,
            Self::Multipart(error) => error.status(),
            Self::Extraction(_)
            | Self::Combine(_)
            | Self::Serialize(_)
            | Self::Persist(_)
            | Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtractError> for UploadError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::NoTablesFound => Self::NoTablesFound,
            other => Self::Extraction(other),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::UnsupportedType { filename } = &self {
            tracing::info!(%filename, "upload rejected: unsupported file type");
        } else if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "upload failed");
        } else {
            tracing::info!(code = self.code(), error = %self, "upload rejected");
        }

        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            self.to_string(),
        )
            .into_response()
    }
}
