//! # API Error Type
//!
//! Flattens every lower-layer failure into a code plus a human-readable
//! message. The message is what UI states carry.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Skypass                                │
//! │                                                                         │
//! │  State holder action (save, delete, create tag)                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Journal ── JournalError::Validation ──┐                                │
//! │         │                              │                                │
//! │         └── JournalError::Db ──────────┼──► ApiError { code, message }  │
//! │                                        │          │                     │
//! │  Live query ── DbError ────────────────┘          ▼                     │
//! │                                        UiState::Error(message)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup failures (config, opening the store) use [`AppError`] instead.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use skypass_core::{CoreError, ValidationError};
use skypass_db::{DbError, JournalError};

/// Error surfaced to the presentation layer.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "title is required"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Entity not found
    NotFound,

    /// Input validation failed, or a name is already taken
    ValidationError,

    /// Database operation failed
    DatabaseError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::InvalidData(e) => {
                tracing::error!("Invalid stored data: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is corrupt")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Validation(e) => e.into(),
            JournalError::Db(e) => e.into(),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EntryNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Startup Errors
// =============================================================================

/// Errors that stop the application from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not determine the {0} directory")]
    NoProjectDir(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

/// Result type for startup operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passes_through() {
        let err: ApiError = JournalError::Validation(ValidationError::Required {
            field: "title".to_string(),
        })
        .into();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "title is required");
    }

    #[test]
    fn test_db_errors_are_flattened() {
        let err: ApiError = DbError::not_found("TravelEntry", 9).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "TravelEntry not found: 9");

        let err: ApiError = DbError::QueryFailed("no such table".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let err: ApiError = DbError::duplicate("category", "Hiking").into();
        assert_eq!(err.message, "category 'Hiking' already exists");
    }

    #[test]
    fn test_core_errors() {
        let err: ApiError = CoreError::EntryNotFound(3).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Travel entry 3 not found");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_string(&ApiError::from(CoreError::EntryNotFound(3))).unwrap();
        assert_eq!(json, r#"{"code":"NOT_FOUND","message":"Travel entry 3 not found"}"#);

        let json = serde_json::to_string(&ApiError::validation("boom")).unwrap();
        assert_eq!(json, r#"{"code":"VALIDATION_ERROR","message":"boom"}"#);
    }
}
