//! # Entry Filter
//!
//! Derives the visible entry list from the full list, an optional category
//! and a free-text query.
//!
//! ## Algorithm
//! ```text
//! full list (date DESC, from the live query)
//!      │
//!      ▼
//! category set?  ──► keep entry.category == category   (exact, case-sensitive)
//!      │
//!      ▼
//! query non-empty? ─► keep title or description containing query
//!      │                                              (case-insensitive)
//!      ▼
//! visible list (same relative order, never re-sorted)
//! ```
//!
//! Every change to any input recomputes the whole list in memory. That is
//! fine at journal sizes (up to low thousands of entries); larger stores
//! would need query-level filtering instead.

use serde::{Deserialize, Serialize};

use crate::types::{TravelEntry, TravelEntryWithTags};

/// Category filter plus search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Exact category to keep; `None` keeps every category.
    pub category: Option<String>,
    /// Substring to look for in title or description; empty keeps everything.
    pub query: String,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// True when at least one input narrows the list.
    pub fn is_active(&self) -> bool {
        self.category.is_some() || !self.query.is_empty()
    }

    /// Checks a single entry against both inputs.
    pub fn matches(&self, entry: &TravelEntry) -> bool {
        if let Some(category) = &self.category {
            if entry.category != *category {
                return false;
            }
        }

        if self.query.is_empty() {
            return true;
        }

        let needle = self.query.to_lowercase();
        entry.title.to_lowercase().contains(&needle)
            || entry.description.to_lowercase().contains(&needle)
    }

    /// Returns the visible subset of `entries`, preserving their order.
    pub fn apply(&self, entries: &[TravelEntryWithTags]) -> Vec<TravelEntryWithTags> {
        if !self.is_active() {
            return entries.to_vec();
        }

        entries
            .iter()
            .filter(|with_tags| self.matches(&with_tags.entry))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: i64, title: &str, description: &str, category: &str) -> TravelEntryWithTags {
        let date = Utc.with_ymd_and_hms(2024, 1, id as u32, 0, 0, 0).unwrap();
        TravelEntryWithTags {
            entry: TravelEntry::new(title, description, date, 1.0, 1.0, 0.0)
                .with_id(id)
                .with_category(category),
            tags: Vec::new(),
        }
    }

    fn journal() -> Vec<TravelEntryWithTags> {
        vec![
            item(5, "Lake Hike", "Morning loop", "Hiking"),
            item(4, "Old town", "Walked by the LAKE front", "City Tour"),
            item(3, "Ridge", "windy", "hiking"),
            item(2, "Coast drive", "", "Road Trip"),
            item(1, "Summit", "lake view from the top", "Hiking"),
        ]
    }

    fn ids(entries: &[TravelEntryWithTags]) -> Vec<i64> {
        entries.iter().map(|e| e.entry.id).collect()
    }

    #[test]
    fn test_inactive_filter_keeps_everything_in_order() {
        let all = journal();
        let filter = EntryFilter::new();
        assert!(!filter.is_active());
        assert_eq!(ids(&filter.apply(&all)), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_category_is_exact_and_case_sensitive() {
        let filter = EntryFilter::new().with_category("Hiking");
        assert_eq!(ids(&filter.apply(&journal())), vec![5, 1]);
    }

    #[test]
    fn test_query_is_case_insensitive_over_title_and_description() {
        let filter = EntryFilter::new().with_query("LaKe");
        assert_eq!(ids(&filter.apply(&journal())), vec![5, 4, 1]);
    }

    #[test]
    fn test_category_and_query_combine() {
        let filter = EntryFilter::new().with_category("Hiking").with_query("view");
        assert_eq!(ids(&filter.apply(&journal())), vec![1]);
    }

    #[test]
    fn test_unknown_category_yields_empty_list() {
        let filter = EntryFilter::new().with_category("Vacation");
        assert!(filter.apply(&journal()).is_empty());
    }

    #[test]
    fn test_visible_set_matches_definition() {
        let all = journal();
        let categories = [None, Some("Hiking"), Some("City Tour"), Some("Nowhere")];
        let queries = ["", "lake", "O", "zzz"];

        for category in categories {
            for query in queries {
                let mut filter = EntryFilter::new().with_query(query);
                filter.category = category.map(str::to_string);

                let expected: Vec<i64> = all
                    .iter()
                    .filter(|e| category.map_or(true, |c| e.entry.category == c))
                    .filter(|e| {
                        let q = query.to_lowercase();
                        q.is_empty()
                            || e.entry.title.to_lowercase().contains(&q)
                            || e.entry.description.to_lowercase().contains(&q)
                    })
                    .map(|e| e.entry.id)
                    .collect();

                assert_eq!(ids(&filter.apply(&all)), expected, "{filter:?}");
            }
        }
    }
}
