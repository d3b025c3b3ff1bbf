//! HTTP front end that turns an uploaded PDF into one CSV of all its tables.

pub mod config;
pub mod csv_pipeline;
pub mod error;
pub mod models;
pub mod routes;
pub mod upload;

pub use config::AppConfig;
pub use error::UploadError;
pub use routes::{AppState, router};
