use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Navigation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Element is no longer attached to the page: {0}")]
    StaleElement(String),

    #[error("No page has been loaded")]
    NoPage,

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;
