#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use pdf_table_csv::{AppConfig, AppState, router};
use pdf_tables::{Cell, ExtractError, Extraction, PageSelector, RawTable, TableExtractor};

pub const BOUNDARY: &str = "pdf-table-csv-test-boundary";

/// Returns whatever tables it was built with.
pub struct CannedExtractor(pub Vec<RawTable>);

impl TableExtractor for CannedExtractor {
    fn extract(&self, _: &[u8], _: &PageSelector) -> Result<Extraction, ExtractError> {
        if self.0.is_empty() {
            return Err(ExtractError::NoTablesFound);
        }
        Ok(Extraction {
            tables: self.0.clone(),
            warnings: Vec::new(),
        })
    }
}

pub struct FailingExtractor;

impl TableExtractor for FailingExtractor {
    fn extract(&self, _: &[u8], _: &PageSelector) -> Result<Extraction, ExtractError> {
        Err(ExtractError::Engine("engine exploded".to_string()))
    }
}

pub fn table(page: u32, header: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
    RawTable::new(
        page,
        header.iter().map(|name| (*name).to_string()).collect(),
        rows,
    )
}

pub fn app(root: &Path, extractor: impl TableExtractor + 'static) -> Router {
    app_with_config(AppConfig::with_storage_root(root), extractor)
}

pub fn app_with_config(config: AppConfig, extractor: impl TableExtractor + 'static) -> Router {
    config
        .ensure_directories()
        .expect("storage directories should be created");
    router(AppState::new(config, Arc::new(extractor)))
}

/// One multipart part: field name, optional filename, body.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub body: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(filename: &'a str, body: &'a [u8]) -> Self {
        Self {
            name: "file",
            filename: Some(filename),
            body,
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.body);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("request should build")
}
