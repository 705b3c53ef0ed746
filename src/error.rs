//! Host-level error model surfaced by the binary.

use std::io;

use helpdesk_api::HelpdeskError;
use thiserror::Error;

/// Represents everything that can end a run: invalid configuration, settings file problems, or a failure inside the export itself.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("settings error: {0}")]
    Settings(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Export(#[from] HelpdeskError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Settings(err.to_string())
    }
}
