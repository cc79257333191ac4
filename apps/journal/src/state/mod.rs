//! # State Module
//!
//! Presentation state holders. Each holder owns its inputs, publishes a
//! snapshot through a `tokio::sync::watch` channel and exposes the actions
//! its screen needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                          ┌──────────────┐                               │
//! │                          │   Journal    │  (cheap clone, shared pool)   │
//! │                          └──────┬───────┘                               │
//! │          ┌──────────────────────┼──────────────────────┐               │
//! │          ▼                      ▼                      ▼                │
//! │  ┌────────────────┐   ┌──────────────────┐   ┌──────────────────┐      │
//! │  │ TravelLogModel │   │ EntryDetailModel │   │  EntryFormModel  │      │
//! │  │                │   │                  │   │                  │      │
//! │  │ live list      │   │ live single      │   │ fields + dialog  │      │
//! │  │ + filter watch │   │ + deleting flag  │   │ + LocationProv.  │      │
//! │  └────────────────┘   └──────────────────┘   └──────────────────┘      │
//! │                                                                         │
//! │  LIFETIME:                                                             │
//! │  • Live subscriptions run in spawned tasks owned by the holder         │
//! │  • Dropping a holder aborts its task                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod entry_detail;
mod entry_form;
mod travel_log;

pub use entry_detail::{EntryDetailModel, EntryDetailState};
pub use entry_form::{
    CategoryDialog, EntryFields, EntryFormModel, EntryFormState, EntryFormView,
    EMPTY_CATEGORY_MESSAGE, REQUIRED_FIELDS_MESSAGE,
};
pub use travel_log::{TravelLogModel, TravelLogUiState, TravelLogView};
