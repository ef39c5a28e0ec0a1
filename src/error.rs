use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Source file '{}' could not be read: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Unsupported source format for '{}' (expected .csv, .xlsx, .xls or .ods)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Missing required column '{0}' in header row")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
