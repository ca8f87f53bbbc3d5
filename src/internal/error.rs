//! Error types for loading models and driving migration runners.

use std::path::PathBuf;

use thiserror::Error;

use crate::internal::config::StorageKind;

/// Errors that can occur while loading models or running migrations.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Command-line arguments could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Neither a connection string nor connection options were configured.
    #[error("No connection string or connection options configured")]
    MissingConnection,

    /// Connection settings could not be turned into a database URL.
    #[error("Invalid connection settings: {0}")]
    InvalidConnection(String),

    /// Configuration file could not be read or parsed.
    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A model glob pattern is malformed.
    #[error("Invalid glob pattern `{pattern}`: {message}")]
    Glob { pattern: String, message: String },

    /// The configured record table differs from the one the runner writes to.
    #[error("Configured record table `{configured}` does not match runner table `{runner}`")]
    TableMismatch { configured: String, runner: String },

    /// A migration or seed name pattern is not a valid regular expression.
    #[error("Invalid unit pattern `{pattern}`: {message}")]
    UnitPattern { pattern: String, message: String },

    /// A model definition file could not be parsed.
    #[error("Failed to parse model definition {path}: {message}")]
    Definition { path: PathBuf, message: String },

    /// A model definition file has an extension no importer understands.
    #[error("Unsupported model definition format: {0}")]
    UnsupportedFormat(PathBuf),

    /// An association names a model that is not registered.
    #[error("Model `{model}` associates with unknown model `{target}`")]
    UnknownModel { model: String, target: String },

    /// An association is declared with missing or conflicting settings.
    #[error("Invalid association on `{model}`: {message}")]
    InvalidAssociation { model: String, message: String },

    /// The runner does not support the configured storage mechanism.
    #[error("Unsupported {kind} storage: {storage}")]
    UnsupportedStorage { kind: String, storage: StorageKind },

    /// Error raised by the ORM or the migration runner, passed through as is.
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    /// IO error during discovery or file reads.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_display() {
        let err = LoaderError::UnknownModel {
            model: "Post".to_string(),
            target: "Author".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Model `Post` associates with unknown model `Author`"
        );
    }

    #[test]
    fn test_loader_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LoaderError = io_err.into();
        assert!(matches!(err, LoaderError::Io(_)));
        assert_eq!(err.to_string(), "IO error: file not found");
    }

    #[test]
    fn test_database_error_is_transparent() {
        let db_err = sea_orm::DbErr::Custom("table is locked".to_string());
        let expected = db_err.to_string();
        let err: LoaderError = db_err.into();
        assert_eq!(err.to_string(), expected);
    }
}
