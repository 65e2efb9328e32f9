//! Error types for depurar.

use std::path::PathBuf;

/// Result type alias for depurar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the cleaning pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A statistic was requested over a column with no usable values.
    #[error("Cannot compute {statistic} for column '{column}': no non-missing values")]
    Computation {
        /// The column the statistic was computed over.
        column: String,
        /// The statistic that could not be computed (mean, most frequent).
        statistic: String,
    },

    /// Column not found in schema.
    #[error("Column '{name}' not found in schema")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Configuration file could not be parsed.
    #[error("Config parse error: {message}")]
    Config {
        /// Description of the parse failure.
        message: String,
    },

    /// Schema mismatch between a table and what a stage expects.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the schema mismatch.
        message: String,
    },

    /// Transform error.
    #[error("Transform error: {message}")]
    Transform {
        /// Description of the transform error.
        message: String,
    },
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an I/O error without path context.
    pub fn io_no_path(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }

    /// Create a computation error for a column statistic.
    pub fn computation(column: impl Into<String>, statistic: impl Into<String>) -> Self {
        Self::Computation {
            column: column.into(),
            statistic: statistic.into(),
        }
    }

    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a config parse error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a transform error.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Returns true for errors raised because a statistic was undefined.
    #[must_use]
    pub fn is_computation(&self) -> bool {
        matches!(self, Self::Computation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::io(io_err, "/out/students.csv");
        assert!(err.to_string().contains("/out/students.csv"));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_io_error_without_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io_no_path(io_err);
        assert!(err.to_string().contains("None"));
    }

    #[test]
    fn test_computation_error() {
        let err = Error::computation("grade", "mean");
        let msg = err.to_string();
        assert!(msg.contains("grade"));
        assert!(msg.contains("mean"));
        assert!(err.is_computation());
    }

    #[test]
    fn test_column_not_found() {
        let err = Error::column_not_found("department");
        assert!(err.to_string().contains("department"));
        assert!(!err.is_computation());
    }

    #[test]
    fn test_invalid_config() {
        let err = Error::invalid_config("rows must be positive");
        assert!(err.to_string().contains("rows must be positive"));
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("expected `=`");
        assert!(err.to_string().contains("expected `=`"));
    }

    #[test]
    fn test_schema_mismatch() {
        let err = Error::schema_mismatch("expected Utf8, got Int64");
        assert!(err.to_string().contains("expected Utf8, got Int64"));
    }

    #[test]
    fn test_transform_error() {
        let err = Error::transform("cannot round a text column");
        assert!(err.to_string().contains("cannot round a text column"));
    }
}
