use scuba_driver::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Seed page {url} is unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Seed page {url} returned HTTP {status}")]
    SeedStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
