//! # Entry Form State
//!
//! Add/edit form for a single entry, plus the create-category dialog.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Entry Form States                                 │
//! │                                                                         │
//! │  open(NEW_ID)                         open(id)                          │
//! │     │                                    │                              │
//! │  Initial ── ask LocationProvider      Loading ── load entry + tag ids   │
//! │     │       (absent position is fine)    │            │                 │
//! │     └──────────────┬─────────────────────┘            └──► Error        │
//! │                    ▼                                                    │
//! │               InputReady ◄──── field setters, tag toggles               │
//! │                    │                                                    │
//! │        create_category() ──► Success("Category created: …") / Error     │
//! │                    │                                                    │
//! │                 save() ──► Saving ──► Saved                             │
//! │                                  └──► Error("Please fill all …")        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use skypass_core::{
    now_millis, truncate_to_millis, CoreError, TravelCategory, TravelEntry, TravelTag,
    CATEGORY_COLOR_PALETTE, DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR, NEW_ID,
};
use skypass_db::{Journal, LiveQuery};

use crate::error::ApiError;
use crate::location::LocationProvider;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill all required fields";
pub const EMPTY_CATEGORY_MESSAGE: &str = "Category name cannot be empty";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum EntryFormState {
    Initial,
    Loading,
    InputReady,
    Saving,
    Saved,
    Success(String),
    Error(String),
}

/// Editable entry fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub compass_direction: f32,
    pub distance: Option<f32>,
    /// In selection order.
    pub selected_tag_ids: Vec<i64>,
}

impl Default for EntryFields {
    fn default() -> Self {
        EntryFields {
            title: String::new(),
            description: String::new(),
            date: now_millis(),
            category: DEFAULT_CATEGORY.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            compass_direction: 0.0,
            distance: None,
            selected_tag_ids: Vec::new(),
        }
    }
}

impl EntryFields {
    /// Title present and both coordinates set.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// The create-category dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDialog {
    pub visible: bool,
    pub name: String,
    pub color: String,
}

impl Default for CategoryDialog {
    fn default() -> Self {
        CategoryDialog {
            visible: false,
            name: String::new(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFormView {
    pub state: EntryFormState,
    pub fields: EntryFields,
    pub dialog: CategoryDialog,
}

/// Row the next save writes to.
#[derive(Debug, Clone, Copy)]
struct SaveTarget {
    id: i64,
    /// Kept across saves once the entry exists.
    created_at: Option<DateTime<Utc>>,
}

/// State holder for the add/edit form.
///
/// The first save of a new entry adopts the assigned id, so saving again
/// updates that row.
#[derive(Debug)]
pub struct EntryFormModel {
    journal: Journal,
    /// Id the form was opened with.
    entry_id: i64,
    target: RwLock<SaveTarget>,
    view: watch::Sender<EntryFormView>,
}

impl EntryFormModel {
    /// Opens the form.
    ///
    /// `entry_id == NEW_ID` starts a new entry at the provider's last-known
    /// position; any other id loads that entry for editing.
    pub async fn open(
        journal: Journal,
        entry_id: i64,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        let is_edit = entry_id != NEW_ID;
        let initial = if is_edit {
            EntryFormState::Loading
        } else {
            EntryFormState::Initial
        };

        let mut model = EntryFormModel {
            journal,
            entry_id,
            target: RwLock::new(SaveTarget {
                id: entry_id,
                created_at: None,
            }),
            view: watch::Sender::new(EntryFormView {
                state: initial,
                fields: EntryFields::default(),
                dialog: CategoryDialog::default(),
            }),
        };

        if is_edit {
            model.load().await;
        } else {
            model.locate(location.as_ref());
        }
        model
    }

    async fn load(&mut self) {
        let loaded = self.journal.live_entry_with_tags(self.entry_id).first().await;

        let next = match loaded {
            Ok(Some(with_tags)) => {
                debug!(id = self.entry_id, "Loaded entry for editing");
                let tag_ids = with_tags.tag_ids();
                let entry = with_tags.entry;
                self.target.get_mut().created_at = Some(entry.created_at);
                self.view.send_modify(|view| {
                    view.fields = EntryFields {
                        title: entry.title,
                        description: entry.description,
                        date: entry.date,
                        category: entry.category,
                        latitude: entry.latitude,
                        longitude: entry.longitude,
                        compass_direction: entry.compass_direction,
                        distance: entry.distance,
                        selected_tag_ids: tag_ids,
                    };
                });
                EntryFormState::InputReady
            }
            Ok(None) => EntryFormState::Error(
                ApiError::from(CoreError::EntryNotFound(self.entry_id)).message,
            ),
            Err(e) => EntryFormState::Error(ApiError::from(e).message),
        };
        self.set_state(next);
    }

    fn locate(&self, location: &dyn LocationProvider) {
        match location.last_known() {
            Some(position) => {
                debug!(
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "Prefilled position"
                );
                self.view.send_modify(|view| {
                    view.fields.latitude = position.latitude;
                    view.fields.longitude = position.longitude;
                });
            }
            None => debug!("No last-known position"),
        }
        self.set_state(EntryFormState::InputReady);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_edit(&self) -> bool {
        self.entry_id != NEW_ID
    }

    pub fn subscribe(&self) -> watch::Receiver<EntryFormView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> EntryFormView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> EntryFormState {
        self.view.borrow().state.clone()
    }

    pub fn fields(&self) -> EntryFields {
        self.view.borrow().fields.clone()
    }

    /// Colors offered by the create-category dialog.
    pub fn category_colors(&self) -> &'static [&'static str] {
        CATEGORY_COLOR_PALETTE
    }

    /// Every tag, by name.
    pub fn live_tags(&self) -> LiveQuery<Vec<TravelTag>> {
        self.journal.live_tags()
    }

    /// The category catalog, by name.
    pub fn live_categories(&self) -> LiveQuery<Vec<TravelCategory>> {
        self.journal.live_categories()
    }

    // =========================================================================
    // Field Setters
    // =========================================================================

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.view.send_modify(|view| view.fields.title = title);
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.view.send_modify(|view| view.fields.description = description);
    }

    pub fn set_date(&self, date: DateTime<Utc>) {
        let date = truncate_to_millis(date);
        self.view.send_modify(|view| view.fields.date = date);
    }

    pub fn set_category(&self, category: impl Into<String>) {
        let category = category.into();
        self.view.send_modify(|view| view.fields.category = category);
    }

    pub fn set_location(&self, latitude: f64, longitude: f64) {
        self.view.send_modify(|view| {
            view.fields.latitude = latitude;
            view.fields.longitude = longitude;
        });
    }

    pub fn set_compass_direction(&self, direction: f32) {
        self.view.send_modify(|view| view.fields.compass_direction = direction);
    }

    pub fn set_distance(&self, distance: Option<f32>) {
        self.view.send_modify(|view| view.fields.distance = distance);
    }

    /// Selects the tag if unselected, otherwise unselects it.
    pub fn toggle_tag(&self, tag_id: i64) {
        self.view.send_modify(|view| {
            let selected = &mut view.fields.selected_tag_ids;
            match selected.iter().position(|id| *id == tag_id) {
                Some(index) => {
                    selected.remove(index);
                }
                None => selected.push(tag_id),
            }
        });
    }

    // =========================================================================
    // Category Dialog
    // =========================================================================

    pub fn show_category_dialog(&self) {
        self.view.send_modify(|view| view.dialog.visible = true);
    }

    /// Hides the dialog and resets its name and color.
    pub fn hide_category_dialog(&self) {
        self.view.send_modify(|view| view.dialog = CategoryDialog::default());
    }

    pub fn set_new_category_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.view.send_modify(|view| view.dialog.name = name);
    }

    pub fn set_new_category_color(&self, color: impl Into<String>) {
        let color = color.into();
        self.view.send_modify(|view| view.dialog.color = color);
    }

    /// Creates the category described by the dialog and selects it.
    ///
    /// An existing name is reused and keeps its color.
    pub async fn create_category(&self) -> Result<i64, ApiError> {
        let (name, color) = {
            let view = self.view.borrow();
            (view.dialog.name.clone(), view.dialog.color.clone())
        };

        if name.trim().is_empty() {
            self.set_state(EntryFormState::Error(EMPTY_CATEGORY_MESSAGE.to_string()));
            return Err(ApiError::validation(EMPTY_CATEGORY_MESSAGE));
        }

        match self.journal.create_category(&name, &color).await {
            Ok(id) => {
                info!(id, category = %name, "Category created from form");
                let message = format!("Category created: {}", name);
                self.view.send_modify(|view| {
                    view.fields.category = name;
                    view.dialog = CategoryDialog::default();
                    view.state = EntryFormState::Success(message);
                });
                Ok(id)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Creates a tag and selects it. A blank name is ignored.
    pub async fn create_tag(&self, name: &str, color: &str) -> Result<Option<i64>, ApiError> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        match self.journal.create_tag(name, color).await {
            Ok(id) => {
                self.view
                    .send_modify(|view| view.fields.selected_tag_ids.push(id));
                Ok(Some(id))
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Saves the form with exactly the selected tags.
    ///
    /// ## Returns
    /// The entry id. Incomplete input persists nothing.
    pub async fn save(&self) -> Result<i64, ApiError> {
        self.set_state(EntryFormState::Saving);

        let fields = self.fields();
        if !fields.is_complete() {
            self.set_state(EntryFormState::Error(REQUIRED_FIELDS_MESSAGE.to_string()));
            return Err(ApiError::validation(REQUIRED_FIELDS_MESSAGE));
        }

        // Held across the write so concurrent saves cannot both insert.
        let mut target = self.target.write().await;
        let entry = build_entry(&fields, &target);
        match self
            .journal
            .save_entry_with_tags(&entry, &fields.selected_tag_ids)
            .await
        {
            Ok(id) => {
                info!(id, edit = self.is_edit(), "Entry saved from form");
                *target = SaveTarget {
                    id,
                    created_at: Some(entry.created_at),
                };
                self.set_state(EntryFormState::Saved);
                Ok(id)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn set_state(&self, state: EntryFormState) {
        self.view.send_modify(|view| view.state = state);
    }

    fn fail(&self, err: ApiError) -> ApiError {
        self.set_state(EntryFormState::Error(err.message.clone()));
        err
    }
}

fn build_entry(fields: &EntryFields, target: &SaveTarget) -> TravelEntry {
    let mut entry = TravelEntry::new(
        fields.title.clone(),
        fields.description.clone(),
        fields.date,
        fields.latitude,
        fields.longitude,
        fields.compass_direction,
    )
    .with_id(target.id)
    .with_category(fields.category.clone())
    .with_distance(fields.distance);

    if let Some(created_at) = target.created_at {
        entry.created_at = created_at;
    }
    entry
}
