use std::path::PathBuf;

use thiserror::Error;

use crate::db::SystemId;

/// Convenient result alias for the Starlane library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a request field or literal could not be interpreted.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Raised when an endpoint references a system the traveler cannot see.
    #[error("system {id} not found in the visible starmap")]
    SystemNotFound { id: SystemId },

    /// Database could not be located at the resolved path.
    #[error("database not found at {path}")]
    DatabaseNotFound { path: PathBuf },

    /// Raised when the database lacks the tables the reader requires.
    #[error("unsupported database schema; expected a systems table with id, name and position")]
    UnsupportedSchema,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::Validation`] for the named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by caller input rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::SystemNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field() {
        let error = Error::validation("start", "expected sys:<id> or pos:<decimal>");
        assert_eq!(
            error.to_string(),
            "invalid start: expected sys:<id> or pos:<decimal>"
        );
        assert!(error.is_client_error());
    }

    #[test]
    fn store_errors_are_not_client_errors() {
        let error = Error::DatabaseNotFound {
            path: PathBuf::from("/tmp/missing.db"),
        };
        assert!(!error.is_client_error());
        assert!(error.to_string().contains("/tmp/missing.db"));
    }
}
