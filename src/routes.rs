use std::sync::Arc;

use axum::Router;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use pdf_tables::TableExtractor;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::csv_pipeline::{self, Delivery};
use crate::error::UploadError;
use crate::upload::read_file_part;

const UPLOAD_FORM: &str = include_str!("../templates/upload.html");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<dyn TableExtractor>,
}

impl AppState {
    pub fn new(config: AppConfig, extractor: Arc<dyn TableExtractor>) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.upload.max_upload_bytes;

    Router::new()
        .route("/", get(upload_form_route))
        .route(
            "/upload",
            post(upload_route).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn upload_form_route() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

async fn upload_route(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match upload_response(&state, multipart).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn upload_response(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, UploadError> {
    // A body that is not multipart at all has no file part.
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "request is not multipart");
        UploadError::MissingFile
    })?;

    let upload = read_file_part(&mut multipart).await?;
    let delivery =
        csv_pipeline::process_upload(&state.config, Arc::clone(&state.extractor), upload).await?;
    csv_attachment(delivery)
}

fn csv_attachment(delivery: Delivery) -> Result<Response, UploadError> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        delivery.file_name
    ))
    .map_err(|error| UploadError::Processing(error.to_string()))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        delivery.csv,
    )
        .into_response())
}
