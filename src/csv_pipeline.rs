use std::sync::Arc;

use axum::body::Bytes;
use pdf_tables::{
    CombinedTable, Extraction, PageSelector, TableExtractor, combine, flatten, write_csv_to_string,
};

use crate::config::AppConfig;
use crate::error::UploadError;
use crate::models::{JobState, UploadJob};
use crate::upload::{UploadedFile, allowed_file, output_file_name, secure_filename};

pub const CSV_DELIMITER: u8 = b',';

/// A finished conversion ready to be sent back as an attachment.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub file_name: String,
    pub csv: String,
}

/// Runs one upload through validate, persist, extract, flatten, combine and
/// serialize.
///
/// The uploaded PDF is kept under the intake directory and the CSV under the
/// output directory; both overwrite files of the same name.
///
/// # Errors
///
/// Returns the first failing step's error; the job is marked failed first.
pub async fn process_upload(
    config: &AppConfig,
    extractor: Arc<dyn TableExtractor>,
    upload: UploadedFile,
) -> Result<Delivery, UploadError> {
    let allowed_extension = &config.upload.allowed_extension;
    if !allowed_file(&upload.filename, allowed_extension) {
        return Err(UploadError::UnsupportedType {
            filename: upload.filename,
        });
    }

    let sanitized = secure_filename(&upload.filename, allowed_extension)?;
    let csv_name = output_file_name(&sanitized);
    let mut job = UploadJob::new(
        sanitized.clone(),
        config.storage.intake_dir.join(&sanitized),
        config.storage.output_dir.join(&csv_name),
    );
    job.advance_to(JobState::Validated);
    tracing::info!(
        original = %upload.filename,
        file = %sanitized,
        bytes = upload.bytes.len(),
        "upload accepted"
    );

    match run_job(&mut job, config, extractor, upload.bytes).await {
        Ok((csv, combined)) => {
            job.advance_to(JobState::Delivered);
            tracing::info!(
                file = %job.filename,
                rows = combined.row_count(),
                tables = combined.table_count,
                elapsed_ms = (chrono::Utc::now() - job.received_at).num_milliseconds(),
                "csv delivered"
            );
            Ok(Delivery {
                file_name: csv_name,
                csv,
            })
        }
        Err(error) => {
            job.fail(error.to_string());
            Err(error)
        }
    }
}

async fn run_job(
    job: &mut UploadJob,
    config: &AppConfig,
    extractor: Arc<dyn TableExtractor>,
    bytes: Bytes,
) -> Result<(String, CombinedTable), UploadError> {
    tokio::fs::write(&job.input_path, &bytes).await?;

    let extraction = extract_tables(extractor, bytes).await?;
    for warning in &extraction.warnings {
        warning.log();
    }
    if extraction.tables.is_empty() {
        return Err(UploadError::NoTablesFound);
    }
    job.advance_to(JobState::Extracted);

    let flattened = extraction.tables.into_iter().map(flatten).collect::<Vec<_>>();
    job.advance_to(JobState::Flattened);

    let combined = combine(flattened, config.combine_options())?;
    job.advance_to(JobState::Combined);

    let csv = write_csv_to_string(&combined, CSV_DELIMITER)?;
    tokio::fs::write(&job.output_path, csv.as_bytes()).await?;
    job.advance_to(JobState::Serialized);

    Ok((csv, combined))
}

async fn extract_tables(
    extractor: Arc<dyn TableExtractor>,
    bytes: Bytes,
) -> Result<Extraction, UploadError> {
    let extraction = tokio::task::spawn_blocking(move || extractor.extract(&bytes, &PageSelector::All))
        .await
        .map_err(|error| UploadError::Processing(format!("extraction task failed: {error}")))??;

    tracing::debug!(
        tables = extraction.tables.len(),
        warnings = extraction.warnings.len(),
        "extraction completed"
    );
    Ok(extraction)
}
