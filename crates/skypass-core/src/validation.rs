//! # Validation Module
//!
//! Save-time validation for the travel journal.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form state holder (skypass-app)                              │
//! │  └── Blank category/tag names short-circuit before any call            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Journal (skypass-db aggregation layer)                       │
//! │  └── THIS MODULE: title, coordinates, blank names                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key cascades on the entry/tag join                        │
//! │                                                                         │
//! │  The store accepts any values: a blank title or a (0, 0) position is   │
//! │  only rejected here.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known gap
//! A real entry logged at exactly latitude 0 or longitude 0 cannot be told
//! apart from "not located yet" and is rejected.

use crate::error::ValidationError;
use crate::types::TravelEntry;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Entry Validators
// =============================================================================

/// Validates an entry title. Any non-blank title is accepted.
pub fn validate_entry_title(title: &str) -> ValidationResult<()> {
    require("title", title)
}

/// Validates that both coordinates have been set.
///
/// Zero is the "not located yet" sentinel, so it is rejected on either axis.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> ValidationResult<()> {
    if latitude == 0.0 {
        return Err(ValidationError::MustBeNonZero {
            field: "latitude".to_string(),
        });
    }

    if longitude == 0.0 {
        return Err(ValidationError::MustBeNonZero {
            field: "longitude".to_string(),
        });
    }

    Ok(())
}

/// Validates an entry before it is saved.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use skypass_core::{validation::validate_entry, TravelEntry};
///
/// let ok = TravelEntry::new("Hike", "", Utc::now(), 45.0, 7.0, 0.0);
/// assert!(validate_entry(&ok).is_ok());
///
/// let blank = TravelEntry::new("  ", "", Utc::now(), 45.0, 7.0, 0.0);
/// assert!(validate_entry(&blank).is_err());
/// ```
pub fn validate_entry(entry: &TravelEntry) -> ValidationResult<()> {
    validate_entry_title(&entry.title)?;
    validate_coordinates(entry.latitude, entry.longitude)
}

// =============================================================================
// Category / Tag Validators
// =============================================================================

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a category name (non-blank).
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    require("category name", name)
}

/// Validates a tag name (non-blank).
pub fn validate_tag_name(name: &str) -> ValidationResult<()> {
    require("tag name", name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(title: &str, lat: f64, lon: f64) -> TravelEntry {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        TravelEntry::new(title, "", date, lat, lon, 0.0)
    }

    #[test]
    fn test_validate_entry_title() {
        assert!(validate_entry_title("Hike").is_ok());
        assert!(validate_entry_title("").is_err());
        assert!(validate_entry_title("   ").is_err());
        assert!(validate_entry_title(&"A".repeat(500)).is_ok());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(45.0, 7.0).is_ok());
        assert!(validate_coordinates(-33.9, -70.6).is_ok());

        assert_eq!(
            validate_coordinates(0.0, 7.0),
            Err(ValidationError::MustBeNonZero {
                field: "latitude".to_string()
            })
        );
        assert_eq!(
            validate_coordinates(45.0, 0.0),
            Err(ValidationError::MustBeNonZero {
                field: "longitude".to_string()
            })
        );
    }

    #[test]
    fn test_validate_entry() {
        assert!(validate_entry(&entry("Hike", 45.0, 7.0)).is_ok());
        assert!(validate_entry(&entry("", 45.0, 7.0)).is_err());
        // A genuine (0, 0) position is indistinguishable from "not located".
        assert!(validate_entry(&entry("Null Island", 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_category_name("Hiking").is_ok());
        assert!(validate_category_name(" ").is_err());
        assert!(validate_tag_name("Mountain").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name(&"x".repeat(80)).is_ok());
        assert!(validate_category_name(&"x".repeat(80)).is_ok());
    }
}
