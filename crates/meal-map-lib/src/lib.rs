//! Meal Map Library - Place Search and Map Synchronization
//!
//! This library powers the "pick a restaurant" flow of the Bapmate app: it finds
//! where the device is, turns keystrokes into place suggestions, resolves a chosen
//! suggestion into a full place record, and keeps the map viewport and marker set in
//! step with all of it while lookups race each other over the network.
//!
//! # Architecture
//!
//! - **[`LocationProvider`]**: initial viewport from the device fix or a campus fallback
//! - **[`SuggestionSearch`]**: debounced autocomplete with stale-response suppression
//! - **[`PlaceResolver`]**: suggestion to [`PlaceRecord`] via a detail lookup
//! - **[`PlaceRegistry`]**: ordered, id-deduplicated set of picked places (the markers)
//! - **[`ViewportController`]**: the single current [`Region`], last animation wins
//! - **[`PlaceSession`]**: owns all of the above on one event loop and emits [`Update`]s
//!
//! External capabilities are traits: [`Geolocation`] for the device sensor and
//! [`PlaceSearch`] for the place provider (an HTTP implementation lives in
//! [`places::http`] behind the `http` feature).

mod geometry;
mod location;
pub mod places;
mod registry;
mod resolver;
pub mod runtime;
mod search;
mod session;
mod viewport;

#[cfg(test)]
pub(crate) mod test_support;

// Public API exports
pub use geometry::{Coordinate, Region};
pub use location::{Accuracy, Geolocation, InitialRegion, LocationProvider, Permission, RegionSource};
pub use places::{PlaceDetails, PlaceRecord, PlaceSearch, SuggestionItem};
pub use registry::PlaceRegistry;
pub use resolver::PlaceResolver;
pub use search::{SearchConfig, SuggestionSearch, SuggestionsUpdated};
pub use session::{CAMPUS_REGION, DEFAULT_FOCUS_SPAN, Notice, PlaceSession, SessionConfig, Update};
pub use viewport::{Animation, ViewportChange, ViewportController};

use std::time::Duration;

/// Error types for the engine
///
/// Every variant is recoverable: the owning component degrades (fallback region,
/// unchanged suggestion list) or turns it into a user [`Notice`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("No location fix within {0:?}")]
    LocationTimeout(Duration),

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Place search request failed: {0}")]
    SearchRequestFailed(String),

    #[error("Could not resolve place {place_id}: {reason}")]
    ResolutionFailed { place_id: String, reason: String },

    #[error("Invalid coordinate: lat={latitude}, lon={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid region span: {latitude_span} x {longitude_span}")]
    InvalidRegion {
        latitude_span: f64,
        longitude_span: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
