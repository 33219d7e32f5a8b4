use thiserror::Error;

/// Failures while reading a statement. Any of these aborts the whole file.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Not a Comdirect checking export: transaction header not found")]
    InvalidFormat,
    #[error("Invalid date format: {0}")]
    MalformedDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
