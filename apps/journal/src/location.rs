//! # Location
//!
//! The entry form asks a [`LocationProvider`] for the last-known position
//! when a new entry is started. Having no position is normal: the form still
//! becomes editable and the user types coordinates in.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Position { latitude, longitude }
    }
}

/// Source of the device's last-known position.
pub trait LocationProvider: Debug + Send + Sync {
    /// The last-known position, or `None` when unavailable.
    fn last_known(&self) -> Option<Position>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Position);

impl LocationProvider for FixedLocation {
    fn last_known(&self) -> Option<Position> {
        Some(self.0)
    }
}

/// Never has a position.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn last_known(&self) -> Option<Position> {
        None
    }
}

/// Picks the provider matching an optional configured position.
pub fn provider_for(position: Option<(f64, f64)>) -> Arc<dyn LocationProvider> {
    match position {
        Some((latitude, longitude)) => Arc::new(FixedLocation(Position::new(latitude, longitude))),
        None => Arc::new(NoLocation),
    }
}
