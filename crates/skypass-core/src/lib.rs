//! # skypass-core: Pure Journal Logic for Skypass
//!
//! This crate is the **heart** of the Skypass travel journal. It holds the
//! entity model, save-time validation and the filter/search composition as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Skypass Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 State Holders (skypass-app)                     │   │
//! │  │    TravelLogModel ── EntryDetailModel ── EntryFormModel         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ skypass-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │  filter   │  │ validation│                  │   │
//! │  │   │  Entry    │  │ category  │  │  title    │                  │   │
//! │  │   │  Tag      │  │ + query   │  │  coords   │                  │   │
//! │  │   │  Category │  │           │  │  names    │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  skypass-db (Database Layer)                    │   │
//! │  │        SQLite queries, live queries, repositories, Journal      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (TravelEntry, TravelTag, TravelCategory, cross refs)
//! - [`filter`] - Category filter + free-text search over an entry list
//! - [`error`] - Domain error types
//! - [`validation`] - Save-time business rules
//!
//! ## Example Usage
//!
//! ```rust
//! use skypass_core::filter::EntryFilter;
//!
//! let filter = EntryFilter::new().with_category("Hiking").with_query("lake");
//! assert!(filter.is_active());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use filter::EntryFilter;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Identity carried by an entity that has not been persisted yet.
///
/// Saving an entry with this id inserts a new row; any other id replaces
/// the existing row.
pub const NEW_ID: i64 = 0;

/// Category assigned to entries that don't pick one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Color used for categories created without an explicit color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#4A90E2";

/// Color used for tags created without an explicit color.
pub const DEFAULT_TAG_COLOR: &str = "#4285F4";

/// Categories seeded into a freshly created store, as `(name, color)`.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("General", DEFAULT_CATEGORY_COLOR),
    ("Hiking", "#4CAF50"),
    ("City Tour", "#9C27B0"),
    ("Road Trip", "#FF9800"),
    ("Vacation", "#E91E63"),
];

/// Colors offered when creating a new category.
pub const CATEGORY_COLOR_PALETTE: &[&str] = &[
    "#4A90E2", // Blue
    "#4CAF50", // Green
    "#FF9800", // Orange
    "#E91E63", // Pink
    "#9C27B0", // Purple
    "#F44336", // Red
    "#795548", // Brown
    "#607D8B", // Blue Grey
];
