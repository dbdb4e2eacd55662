//! PlaceResolver - suggestion to place record
//!
//! One detail lookup per selection, no retries. A record is produced only when
//! the provider returned usable geometry.

use std::sync::Arc;

use crate::{Coordinate, Error, PlaceRecord, PlaceSearch, Result, SuggestionItem};

#[derive(Clone)]
pub struct PlaceResolver {
    places: Arc<dyn PlaceSearch>,
    language: String,
}

impl PlaceResolver {
    pub fn new(places: Arc<dyn PlaceSearch>, language: impl Into<String>) -> Self {
        Self {
            places,
            language: language.into(),
        }
    }

    /// Fetch the details for `suggestion` and build its record
    ///
    /// Every failure is reported as [`Error::ResolutionFailed`].
    pub async fn resolve(&self, suggestion: &SuggestionItem) -> Result<PlaceRecord> {
        #[cfg(feature = "profiling")]
        profiling::scope!("resolver::resolve");

        let failed = |reason: String| Error::ResolutionFailed {
            place_id: suggestion.id.clone(),
            reason,
        };

        let details = self
            .places
            .details(&suggestion.id, &self.language)
            .await
            .map_err(|e| match e {
                e @ Error::ResolutionFailed { .. } => e,
                other => failed(other.to_string()),
            })?;

        let (lat, lng) = details
            .location
            .ok_or_else(|| failed("response has no geometry".to_string()))?;
        let location = Coordinate::new(lat, lng).map_err(|e| failed(e.to_string()))?;

        // Providers sometimes leave the name blank; the suggestion label is what the user saw
        let name = if details.name.trim().is_empty() {
            suggestion.label.clone()
        } else {
            details.name
        };

        Ok(PlaceRecord {
            id: suggestion.id.clone(),
            name,
            address: details.formatted_address,
            rating: details.rating,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaceDetails;
    use crate::test_support::{FakePlaces, details_at};
    use std::time::Duration;

    fn resolver(places: FakePlaces) -> PlaceResolver {
        PlaceResolver::new(Arc::new(places), "ko")
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_builds_record() {
        let places = FakePlaces::new().detail(
            "p1",
            Duration::from_millis(20),
            details_at("필동 부대찌개", 37.5607, 126.9946),
        );
        let record = resolver(places)
            .resolve(&SuggestionItem::new("p1", "필동 부대찌개"))
            .await
            .unwrap();
        assert_eq!(record.id, "p1");
        assert_eq!(record.name, "필동 부대찌개");
        assert_eq!(record.location, Coordinate::new(37.5607, 126.9946).unwrap());
        assert_eq!(record.rating, Some(4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_geometry_fails() {
        let places = FakePlaces::new().detail(
            "p1",
            Duration::ZERO,
            PlaceDetails {
                name: "x".to_string(),
                ..Default::default()
            },
        );
        let err = resolver(places)
            .resolve(&SuggestionItem::new("p1", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResolutionFailed { place_id, .. } if place_id == "p1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_geometry_fails() {
        let places = FakePlaces::new().detail("p1", Duration::ZERO, details_at("x", 137.0, 0.0));
        let err = resolver(places)
            .resolve(&SuggestionItem::new("p1", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResolutionFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_failure_is_resolution_failure() {
        let places = Arc::new(FakePlaces::new());
        let resolver = PlaceResolver::new(places.clone(), "ko");
        let err = resolver
            .resolve(&SuggestionItem::new("nope", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResolutionFailed { place_id, .. } if place_id == "nope"));
        // Exactly one attempt
        assert_eq!(places.detail_calls(), vec!["nope".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_name_uses_label() {
        let places = FakePlaces::new().detail("p1", Duration::ZERO, details_at(" ", 37.5, 127.0));
        let record = resolver(places)
            .resolve(&SuggestionItem::new("p1", "충무로 김밥"))
            .await
            .unwrap();
        assert_eq!(record.name, "충무로 김밥");
    }
}
