//! Error types for bctheme.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BcError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing config: {0}")]
    MissingConfig(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("approval required: {0}")]
    ApprovalRequired(String),

    #[error("lock timeout: {0}")]
    LockTimeout(String),

    #[error("network error: {0}")]
    Network(String),
}

impl BcError {
    /// Stable machine-readable code used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Io(_) => "io_error",
            Self::Persistence(_) => "persistence_error",
            Self::Csv(_) => "csv_error",
            Self::Archive(_) => "archive_error",
            Self::Config(_) | Self::MissingConfig(_) => "config_error",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Serialization(_) => "serialization_error",
            Self::ApprovalRequired(_) => "approval_required",
            Self::LockTimeout(_) => "lock_timeout",
            Self::Network(_) => "network_error",
        }
    }
}

impl From<rusqlite::Error> for BcError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<csv::Error> for BcError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<walkdir::Error> for BcError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match err.into_io_error() {
            Some(io) => Self::Io(io),
            None => Self::Io(std::io::Error::other(format!("walk {path}: loop detected"))),
        }
    }
}

impl From<zip::result::ZipError> for BcError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<xmltree::ParseError> for BcError {
    fn from(err: xmltree::ParseError) -> Self {
        Self::Serialization(format!("xml: {err}"))
    }
}

impl From<reqwest::Error> for BcError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BcError>;
