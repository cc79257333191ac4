//! # Error Types
//!
//! Domain-specific error types for skypass-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  skypass-core errors (this file)                                       │
//! │  ├── CoreError        - Lookups that came back empty                   │
//! │  └── ValidationError  - Save-time validation failures                  │
//! │                                                                         │
//! │  skypass-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── JournalError     - Validation or DbError from the Journal         │
//! │                                                                         │
//! │  skypass-app errors                                                    │
//! │  └── ApiError         - Code + message carried by UI states            │
//! │                                                                         │
//! │  Flow: ValidationError → JournalError → ApiError → UI state message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core journal errors.
///
/// Lookups return `Option`; state holders turn an absent entry into
/// `EntryNotFound` when the screen needs one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Travel entry cannot be found.
    #[error("Travel entry {0} not found")]
    EntryNotFound(i64),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything reaches the store. The store itself accepts any
/// values, so these checks are the only guard.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Coordinate left at zero, which means "not located yet".
    #[error("{field} must be set")]
    MustBeNonZero { field: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
