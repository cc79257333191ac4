//! # Domain Types
//!
//! Entities of the travel journal.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │  TravelEntry    │   │ TravelEntryTagCross  │   │   TravelTag     │  │
//! │  │  ─────────────  │   │ Ref                  │   │  ─────────────  │  │
//! │  │  id (i64)       │◄──│  entry_id (FK, CASC) │   │  id (i64)       │  │
//! │  │  title, date    │   │  tag_id   (FK, CASC) │──►│  name           │  │
//! │  │  lat / lon      │   └──────────────────────┘   │  color          │  │
//! │  │  compass, dist  │                              └─────────────────┘  │
//! │  │  category (str) │ ─ ─ ─ by name ─ ─ ─ ┐                             │
//! │  └─────────────────┘                     ▼                             │
//! │                                  ┌─────────────────┐                    │
//! │                                  │ TravelCategory  │                    │
//! │                                  │  id, name,color │                    │
//! │                                  └─────────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries an `i64` id assigned by the store. An id of
//! [`NEW_ID`](crate::NEW_ID) (0) marks an entity that has not been saved.
//!
//! ## Timestamps
//! The store keeps epoch milliseconds, so every timestamp built here is
//! truncated to millisecond precision. An entry read back from the store is
//! then equal to the one that was saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR, DEFAULT_TAG_COLOR, NEW_ID};

// =============================================================================
// Time helpers
// =============================================================================

/// Drops sub-millisecond precision from a timestamp.
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// Current time at millisecond precision.
pub fn now_millis() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

// =============================================================================
// Travel Entry
// =============================================================================

/// A journaled trip record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TravelEntry {
    /// Store-assigned identity, 0 until first save.
    pub id: i64,

    /// Required at save time; the store itself accepts blanks.
    pub title: String,

    /// Free text, may be empty.
    pub description: String,

    /// User-chosen date of the trip.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Degrees. Zero means "not located yet" and is rejected on save.
    pub latitude: f64,

    /// Degrees. Zero means "not located yet" and is rejected on save.
    pub longitude: f64,

    /// Compass heading when the entry was logged (0-359 by convention).
    pub compass_direction: f32,

    /// Optional distance traveled, in km.
    pub distance: Option<f32>,

    /// Category name. Matches a `TravelCategory` by convention only.
    pub category: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl TravelEntry {
    /// Creates an unsaved entry in the default category.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        compass_direction: f32,
    ) -> Self {
        let now = now_millis();
        TravelEntry {
            id: NEW_ID,
            title: title.into(),
            description: description.into(),
            date: truncate_to_millis(date),
            latitude,
            longitude,
            compass_direction,
            distance: None,
            category: DEFAULT_CATEGORY.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Placeholder row used by the category bootstrap routine.
    ///
    /// Carries nothing but the category name; everything else is blank.
    pub fn placeholder(category: impl Into<String>, at: DateTime<Utc>) -> Self {
        let at = truncate_to_millis(at);
        TravelEntry {
            id: NEW_ID,
            title: String::new(),
            description: String::new(),
            date: at,
            latitude: 0.0,
            longitude: 0.0,
            compass_direction: 0.0,
            distance: None,
            category: category.into(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_distance(mut self, distance: Option<f32>) -> Self {
        self.distance = distance;
        self
    }

    /// True until the store has assigned an identity.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.id == NEW_ID
    }

    /// Bumps `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

// =============================================================================
// Travel Tag
// =============================================================================

/// A reusable label attached to entries through the cross-ref table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TravelTag {
    pub id: i64,
    pub name: String,
    /// Hex color, `#RRGGBB`.
    pub color: String,
}

impl TravelTag {
    /// Creates an unsaved tag.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        TravelTag {
            id: NEW_ID,
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Default for TravelTag {
    fn default() -> Self {
        TravelTag::new(String::new(), DEFAULT_TAG_COLOR)
    }
}

// =============================================================================
// Travel Category
// =============================================================================

/// A named, colored grouping.
///
/// Names are unique by application-level checks only; the store has no
/// uniqueness constraint on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TravelCategory {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl TravelCategory {
    /// Creates an unsaved category.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        TravelCategory {
            id: NEW_ID,
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Default for TravelCategory {
    fn default() -> Self {
        TravelCategory::new(DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR)
    }
}

// =============================================================================
// Entry ↔ Tag join
// =============================================================================

/// Join record between an entry and a tag.
///
/// Both keys cascade on delete: removing either side removes the
/// association, never the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TravelEntryTagCrossRef {
    pub entry_id: i64,
    pub tag_id: i64,
}

impl TravelEntryTagCrossRef {
    pub fn new(entry_id: i64, tag_id: i64) -> Self {
        TravelEntryTagCrossRef { entry_id, tag_id }
    }
}

/// An entry together with the tags attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TravelEntryWithTags {
    pub entry: TravelEntry,
    pub tags: Vec<TravelTag>,
}

impl TravelEntryWithTags {
    /// Ids of the attached tags, in tag order.
    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(|tag| tag.id).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_entry_defaults() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let entry = TravelEntry::new("Hike", "", date, 45.0, 7.0, 90.0);

        assert!(entry.is_new());
        assert_eq!(entry.category, "General");
        assert_eq!(entry.distance, None);
        assert_eq!(entry.date, date);
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn test_timestamps_are_millisecond_precision() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = truncate_to_millis(at);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);

        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_placeholder_only_carries_category() {
        let entry = TravelEntry::placeholder("Kayaking", Utc::now());
        assert!(entry.title.is_empty());
        assert!(entry.description.is_empty());
        assert_eq!(entry.latitude, 0.0);
        assert_eq!(entry.category, "Kayaking");
    }

    #[test]
    fn test_tag_and_category_defaults() {
        assert_eq!(TravelTag::default().color, "#4285F4");
        let category = TravelCategory::default();
        assert_eq!(category.name, "General");
        assert_eq!(category.color, "#4A90E2");
    }

    #[test]
    fn test_tag_ids_follow_tag_order() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let with_tags = TravelEntryWithTags {
            entry: TravelEntry::new("Hike", "", date, 1.0, 1.0, 0.0),
            tags: vec![
                TravelTag { id: 3, name: "Alps".into(), color: "#000000".into() },
                TravelTag { id: 1, name: "Snow".into(), color: "#FFFFFF".into() },
            ],
        };
        assert_eq!(with_tags.tag_ids(), vec![3, 1]);
    }

    #[test]
    fn test_entry_serializes_to_json() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let entry = TravelEntry::new("Hike", "Lake loop", date, 45.0, 7.0, 12.5)
            .with_distance(Some(8.5));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["title"], "Hike");
        assert_eq!(json["distance"], 8.5);
        assert_eq!(json["category"], "General");
    }
}
