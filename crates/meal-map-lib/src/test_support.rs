//! Scripted fakes for the external capabilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    Accuracy, Coordinate, Error, Geolocation, Permission, PlaceDetails, PlaceSearch, Region,
    Result, SuggestionItem,
};

/// The fallback region used throughout the tests
pub fn campus_region() -> Region {
    Region::around(Coordinate::new(37.5583, 127.001).unwrap(), 0.005).unwrap()
}

pub fn details_at(name: &str, lat: f64, lng: f64) -> PlaceDetails {
    PlaceDetails {
        name: name.to_string(),
        formatted_address: format!("{name} address"),
        rating: Some(4.0),
        location: Some((lat, lng)),
    }
}

/// How the fake sensor answers `current_position`
#[derive(Clone, Copy)]
pub enum Fix {
    At(Coordinate),
    After(Duration, Coordinate),
    Hang,
    Fail,
}

pub struct FakeGeolocation {
    permission: Permission,
    fix: Fix,
    position_calls: Arc<AtomicUsize>,
}

impl FakeGeolocation {
    pub fn granted(fix: Fix) -> Self {
        Self::with_permission(Permission::Granted, fix)
    }

    pub fn with_permission(permission: Permission, fix: Fix) -> Self {
        Self {
            permission,
            fix,
            position_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn position_calls(&self) -> Arc<AtomicUsize> {
        self.position_calls.clone()
    }
}

#[async_trait]
impl Geolocation for FakeGeolocation {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinate> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        match self.fix {
            Fix::At(c) => Ok(c),
            Fix::After(delay, c) => {
                tokio::time::sleep(delay).await;
                Ok(c)
            }
            Fix::Hang => std::future::pending().await,
            Fix::Fail => Err(Error::LocationUnavailable("no satellites".to_string())),
        }
    }
}

type Scripted<T> = (Duration, Result<T>);

#[derive(Default)]
struct FakeState {
    suggestions: HashMap<String, Scripted<Vec<SuggestionItem>>>,
    details: HashMap<String, Scripted<PlaceDetails>>,
    autocomplete_calls: Vec<String>,
    detail_calls: Vec<String>,
}

/// Place provider answering from a script, each answer after its own delay
///
/// Unscripted queries return no suggestions; unscripted ids fail to resolve.
#[derive(Default)]
pub struct FakePlaces {
    state: Mutex<FakeState>,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggest(self, query: &str, delay: Duration, items: Vec<SuggestionItem>) -> Self {
        self.lock()
            .suggestions
            .insert(query.to_string(), (delay, Ok(items)));
        self
    }

    pub fn fail_suggest(self, query: &str, delay: Duration) -> Self {
        self.lock().suggestions.insert(
            query.to_string(),
            (
                delay,
                Err(Error::SearchRequestFailed("connection reset".to_string())),
            ),
        );
        self
    }

    pub fn detail(self, place_id: &str, delay: Duration, details: PlaceDetails) -> Self {
        self.lock()
            .details
            .insert(place_id.to_string(), (delay, Ok(details)));
        self
    }

    pub fn autocomplete_calls(&self) -> Vec<String> {
        self.lock().autocomplete_calls.clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.lock().detail_calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl PlaceSearch for FakePlaces {
    async fn autocomplete(&self, query: &str, _language: &str) -> Result<Vec<SuggestionItem>> {
        let scripted = {
            let mut state = self.lock();
            state.autocomplete_calls.push(query.to_string());
            state.suggestions.get(query).cloned()
        };
        match scripted {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn details(&self, place_id: &str, _language: &str) -> Result<PlaceDetails> {
        let scripted = {
            let mut state = self.lock();
            state.detail_calls.push(place_id.to_string());
            state.details.get(place_id).cloned()
        };
        match scripted {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Err(Error::ResolutionFailed {
                place_id: place_id.to_string(),
                reason: "not found".to_string(),
            }),
        }
    }
}
