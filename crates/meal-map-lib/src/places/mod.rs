//! Place data types and the place-search capability
//!
//! [`PlaceSearch`] is the seam to the external provider. The engine only ever sees
//! [`SuggestionItem`]s (autocomplete) and [`PlaceDetails`] (detail lookup); turning
//! details into a validated [`PlaceRecord`] is the resolver's job.

#[cfg(feature = "http")]
pub mod http;

use crate::{Coordinate, Result};
use async_trait::async_trait;

/// One autocomplete hit, valid only for the query that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SuggestionItem {
    /// Provider-assigned id, unique within one query's results
    pub id: String,
    /// Human readable text shown in the suggestion list
    pub label: String,
}

impl SuggestionItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Raw detail lookup result, as the provider returned it
///
/// `location` is `None` when the provider omitted geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaceDetails {
    pub name: String,
    pub formatted_address: String,
    pub rating: Option<f64>,
    /// (latitude, longitude) in degrees, unvalidated
    pub location: Option<(f64, f64)>,
}

/// A resolved, display-ready place. Identity is `id`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub location: Coordinate,
}

/// External place-search provider
///
/// Implementations report transport or payload problems as
/// [`Error::SearchRequestFailed`](crate::Error::SearchRequestFailed) for
/// autocomplete and [`Error::ResolutionFailed`](crate::Error::ResolutionFailed) for
/// details. Neither call is expected to time out on its own.
#[async_trait]
pub trait PlaceSearch: Send + Sync + 'static {
    /// Ordered suggestions for a free-text query
    async fn autocomplete(&self, query: &str, language: &str) -> Result<Vec<SuggestionItem>>;

    /// Full details for one suggestion id
    async fn details(&self, place_id: &str, language: &str) -> Result<PlaceDetails>;
}
