//! Service configuration.
//!
//! Values come from built-in defaults, an optional `pdf-table-csv.toml` in the
//! working directory, `PDF2CSV__<SECTION>__<KEY>` environment variables and
//! finally the bare `PORT` variable.

use std::path::{Path, PathBuf};

use ::config::{Config as ConfigBuilder, ConfigError, Environment, File};
use pdf_tables::{ColumnPolicy, CombineOptions, ExtractOptions, HeaderMode, QualityMode};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "pdf-table-csv";
pub const ENV_PREFIX: &str = "PDF2CSV";
pub const PORT_ENV_VAR: &str = "PORT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where uploads and generated CSV files are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_intake_dir")]
    pub intake_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Accepted file extension, without the dot. Matched case-insensitively.
    #[serde(default = "default_allowed_extension")]
    pub allowed_extension: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub header_mode: HeaderMode,

    #[serde(default)]
    pub quality_mode: QualityMode,

    #[serde(default = "default_min_cols")]
    pub min_cols: usize,

    #[serde(default)]
    pub column_policy: ColumnPolicy,

    /// Prepend `page` and `table_id` columns to the CSV.
    #[serde(default)]
    pub provenance: bool,
}

impl AppConfig {
    /// Loads configuration from the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a source cannot be parsed or a value has the
    /// wrong type (for example a non-numeric `PORT`).
    pub fn load() -> Result<Self, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::with_name(CONFIG_FILE_NAME).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var(PORT_ENV_VAR).ok())?
            .build()?
            .try_deserialize()
    }

    /// Configuration that keeps its files under `root`.
    #[must_use]
    pub fn with_storage_root(root: &Path) -> Self {
        Self {
            storage: StorageConfig {
                intake_dir: root.join(default_intake_dir()),
                output_dir: root.join(default_output_dir()),
            },
            ..Self::default()
        }
    }

    /// Creates the intake and output directories if they are missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when a directory cannot be created.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.storage.intake_dir)?;
        std::fs::create_dir_all(&self.storage.output_dir)
    }

    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            header_mode: self.extraction.header_mode,
            quality_mode: self.extraction.quality_mode,
            min_cols: self.extraction.min_cols,
        }
    }

    #[must_use]
    pub fn combine_options(&self) -> CombineOptions {
        CombineOptions {
            policy: self.extraction.column_policy,
            provenance: self.extraction.provenance,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            intake_dir: default_intake_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::default(),
            quality_mode: QualityMode::default(),
            min_cols: default_min_cols(),
            column_policy: ColumnPolicy::default(),
            provenance: false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extension: default_allowed_extension(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// ==================== Default Value Functions ====================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_intake_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_allowed_extension() -> String {
    "pdf".to_string()
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_min_cols() -> usize {
    2
}
