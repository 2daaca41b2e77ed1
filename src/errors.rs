use std::io;

use thiserror::Error;

/// Error type for loading, validating and configuring a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("row {row}: required field '{field}' is missing")]
    MissingField { row: usize, field: &'static str },
    #[error("row {row}: invalid value '{value}' for field '{field}'")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
