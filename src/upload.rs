use axum::body::Bytes;
use axum::extract::Multipart;
use regex::Regex;

use crate::error::UploadError;

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Pulls the first `file` part that carries a filename out of the request.
///
/// # Errors
///
/// `MissingFile` when there is no such part, `EmptyFilename` when the client
/// sent the part with an empty filename, `Multipart` for malformed bodies.
pub async fn read_file_part(multipart: &mut Multipart) -> Result<UploadedFile, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(UploadError::EmptyFilename);
        }

        let bytes = field.bytes().await?;
        return Ok(UploadedFile { filename, bytes });
    }

    Err(UploadError::MissingFile)
}

/// True when the text after the last `.` matches `extension`, ignoring case.
pub fn allowed_file(filename: &str, extension: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
}

/// Turns a client-supplied filename into one safe to join onto a directory.
///
/// Non-ASCII characters are dropped, path separators and whitespace become
/// `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or trailing
/// `.`/`_` are stripped. Reserved Windows device names get a `_` prefix. An
/// empty result falls back to `upload.<extension>`.
///
/// # Errors
///
/// Only fails if the character filter cannot be compiled.
pub fn secure_filename(filename: &str, extension: &str) -> Result<String, UploadError> {
    let unsafe_chars =
        Regex::new(r"[^A-Za-z0-9_.-]").map_err(|error| UploadError::Processing(error.to_string()))?;

    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|ch| if ch == '/' || ch == '\\' { ' ' } else { ch })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|ch| ch == '.' || ch == '_');

    if trimmed.is_empty() {
        return Ok(format!("upload.{extension}"));
    }

    let stem = trimmed.split('.').next().unwrap_or(trimmed);
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|device| device.eq_ignore_ascii_case(stem))
    {
        return Ok(format!("_{trimmed}"));
    }

    Ok(trimmed.to_string())
}

/// `report.pdf` becomes `report.csv`; a name without a `.` just gains the suffix.
pub fn output_file_name(sanitized: &str) -> String {
    let base = sanitized
        .rsplit_once('.')
        .map_or(sanitized, |(base, _)| base);
    format!("{base}.csv")
}
