//! Error types for the ledger-guard library.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`GuardError`]. The deterministic scoring core (rule evaluation and score
//! aggregation) is total and never produces one of these; errors come from the
//! loader, the query engine underneath the profiler, or configuration.

use thiserror::Error;

/// The main error type for the ledger-guard library.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The uploaded file has an extension no loader understands.
    #[error("Unsupported file format '{extension}'. Please upload CSV, JSON, or Parquet.")]
    UnsupportedFormat {
        /// The offending extension, lowercased, or an empty string when absent
        extension: String,
    },

    /// Error from data source operations (decode failures, unreadable files).
    #[error("Error processing file: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "JSON", "Parquet")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested table is not registered with the session.
    #[error("Table '{table}' is not registered")]
    TableNotFound { table: String },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Security-related error.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, GuardError>`.
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true when the error was caused by the caller's input rather
    /// than by the library or its environment.
    ///
    /// Callers exposing the pipeline over a transport map these to a client
    /// error.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GuardError::UnsupportedFormat { .. } | GuardError::DataSource { .. }
        )
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<GuardError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                GuardError::Internal(inner) => GuardError::Internal(format!("{msg}: {inner}")),
                other => GuardError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
