use thiserror::Error;

/// Main error type for rankmetrics
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Caller broke a precondition (zero cutoff, mismatched batch, bad weight)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::Parse(err.to_string())
    }
}

/// Convenient Result type using MetricsError
pub type Result<T> = std::result::Result<T, MetricsError>;
