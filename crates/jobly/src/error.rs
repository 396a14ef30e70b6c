//! Error types for jobly

use crate::value::BindError;
use std::error::Error as _;
use std::fmt;
use thiserror::Error;

/// Result type alias for jobly operations
pub type DbResult<T> = Result<T, DbError>;

/// Which kind of integrity constraint the store rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

impl ConstraintKind {
    /// Map a PostgreSQL SQLSTATE to a constraint kind.
    pub fn from_sqlstate(code: &str) -> Option<Self> {
        match code {
            "23505" => Some(Self::Unique),
            "23503" => Some(Self::ForeignKey),
            "23514" => Some(Self::Check),
            "23502" => Some(Self::NotNull),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
            Self::Check => "check",
            Self::NotNull => "not null",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for data-access operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Caller supplied something the layer cannot compile or accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The targeted row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Integrity constraint rejected by the store
    #[error("Constraint violation ({kind}): {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
    },

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl DbError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a constraint violation of any kind
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// The constraint kind, if this is a constraint violation
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::ConstraintViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Parse a tokio_postgres error into a more specific DbError
    ///
    /// A parameter that failed to encode (see [`BindError`]) is the caller's
    /// input, not a store failure, and becomes [`DbError::InvalidArgument`].
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(bind) = err.source().and_then(|e| e.downcast_ref::<BindError>()) {
            return Self::InvalidArgument(bind.to_string());
        }
        if let Some(db_err) = err.as_db_error() {
            if let Some(kind) = ConstraintKind::from_sqlstate(db_err.code().code()) {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return Self::ConstraintViolation {
                    kind,
                    message: format!("{}: {}", constraint, db_err.message()),
                };
            }
        }
        Self::Query(err)
    }
}
