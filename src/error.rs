use crate::database::DatabaseError;
use std::io;
use thiserror::Error;

/// Unified error type for schema modeling, generation and import
#[derive(Debug, Error)]
pub enum Error {
    /// Structural or usage error (malformed connection string, missing field, failed lookup)
    #[error("data error: {0}")]
    Data(String),

    /// Unrecognized type or key-type token, or a type the dialect cannot map
    #[error("datatype error: {0}")]
    Datatype(String),

    /// The foreign-key graph contains a cycle, so no creation order exists
    #[error("foreign key cycle between tables: {}", .0.join(" -> "))]
    ForeignKeyCycle(Vec<String>),

    #[error("unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// Operation the dialect (or the enabled feature set) cannot perform
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// True for every data error, including the datatype sub-kind.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Error::Data(_) | Error::Datatype(_))
    }

    pub fn is_datatype_error(&self) -> bool {
        matches!(self, Error::Datatype(_))
    }
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Helper to create a Data error
pub fn data_error<S: Into<String>>(msg: S) -> Error {
    Error::Data(msg.into())
}

/// Helper to create a Datatype error
pub fn datatype_error<S: Into<String>>(msg: S) -> Error {
    Error::Datatype(msg.into())
}

/// Helper to create an Unsupported error
pub fn unsupported_error<S: Into<String>>(msg: S) -> Error {
    Error::Unsupported(msg.into())
}
