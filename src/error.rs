//! Error types for schemashift.

use thiserror::Error;

/// The main error type for parsing and diffing schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema text is malformed.
    #[error("{0}")]
    Parse(String),

    /// A column added to an existing table cannot be populated.
    #[error("New column {table}.{column} is NOT NULL without default")]
    NotNullWithoutDefault { table: String, column: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for schemashift operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
