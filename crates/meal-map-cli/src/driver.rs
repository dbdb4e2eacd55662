//! Scripted run of one "pick a place" screen
//!
//! Types the query keystroke by keystroke, waits for the suggestion list, picks
//! one entry and waits until the engine has either registered the place or
//! raised a notice.

use std::sync::Arc;
use std::time::Duration;

use meal_map_lib::places::http::HttpPlaces;
use meal_map_lib::{
    PlaceRecord, PlaceSearch, PlaceSession, Region, RegionSource, SuggestionItem,
    SuggestionsUpdated, Update, ViewportChange,
};
use serde::Serialize;
use tokio::time::{sleep, timeout};

use crate::device::FixedGeolocation;
use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Engine(#[from] meal_map_lib::Error),

    #[error("Query \"{0}\" is too short to be searched")]
    QueryTooShort(String),

    #[error("No suggestions for \"{0}\"")]
    NoSuggestions(String),

    #[error("Cannot pick suggestion {pick}: only {count} available")]
    PickOutOfRange { pick: usize, count: usize },

    #[error("Timed out after {0:?} waiting for {1}")]
    TimedOut(Duration, &'static str),
}

/// What the run ended with
#[derive(Debug, Serialize)]
pub struct Report {
    pub query: String,
    pub suggestions: Vec<SuggestionItem>,
    pub picked: SuggestionItem,
    /// Registered place, absent when resolution failed
    pub place: Option<PlaceRecord>,
    /// False when the place was already registered
    pub added: bool,
    /// User-visible notice, if any
    pub notice: Option<String>,
    pub viewport: Region,
    /// How the initial region was obtained ("device", "fallback: ...", "pending")
    pub initial_region: String,
    /// Distance the map center traveled from the initial region, in meters
    pub moved_meters: f64,
    pub markers: Vec<PlaceRecord>,
}

/// Run against the HTTP place provider
pub async fn run(settings: &Settings) -> Result<Report, DriverError> {
    let places = HttpPlaces::with_base_url(&settings.base_url, &settings.api_key)?;
    run_with(settings, Arc::new(places)).await
}

/// Run against any place provider
pub async fn run_with(
    settings: &Settings,
    places: Arc<dyn PlaceSearch>,
) -> Result<Report, DriverError> {
    profiling::scope!("driver::run");

    let target = settings.query.trim().to_string();
    if target.chars().count() < settings.min_query_chars.max(1) {
        return Err(DriverError::QueryTooShort(settings.query.clone()));
    }

    let geolocation = Arc::new(FixedGeolocation::new(settings.device_position()?));
    let mut session = PlaceSession::start(settings.session_config(), geolocation, places);
    let start_center = session.viewport().region().center();

    let mut typed = String::new();
    let mut latest = None;
    for ch in settings.query.chars() {
        typed.push(ch);
        session.on_query_changed(&typed);
        if let Some(list) = pump_for(&mut session, settings.keystroke_delay()).await {
            latest = Some(list);
        }
    }
    tracing::info!(query = %typed, "Finished typing");

    let list = match latest {
        Some(list) if list.query == target => list,
        _ => timeout(settings.wait(), wait_for_suggestions(&mut session, &target))
            .await
            .map_err(|_| DriverError::TimedOut(settings.wait(), "suggestions"))?,
    };
    for (i, item) in list.suggestions.iter().enumerate() {
        tracing::info!("  [{i}] {} ({})", item.label, item.id);
    }
    if list.suggestions.is_empty() {
        return Err(DriverError::NoSuggestions(target));
    }

    let picked = list
        .suggestions
        .get(settings.pick)
        .cloned()
        .ok_or(DriverError::PickOutOfRange {
            pick: settings.pick,
            count: list.suggestions.len(),
        })?;
    session.select(&picked);

    let outcome = timeout(settings.wait(), wait_for_outcome(&mut session))
        .await
        .map_err(|_| DriverError::TimedOut(settings.wait(), "the picked place"))?;

    let viewport = session.viewport().region();
    let initial_region = match session.initial_region().map(|i| &i.source) {
        Some(RegionSource::Device) => "device".to_string(),
        Some(RegionSource::Fallback(e)) => format!("fallback: {e}"),
        None => "pending".to_string(),
    };

    let (place, added, notice) = match outcome {
        Outcome::Registered { place, added } => (Some(place), added, None),
        Outcome::Notice(message) => (None, false, Some(message)),
    };

    Ok(Report {
        query: session.query().to_string(),
        suggestions: list.suggestions,
        picked,
        place,
        added,
        notice,
        viewport,
        initial_region,
        moved_meters: start_center.distance_to(&viewport.center()),
        markers: session.markers().to_vec(),
    })
}

enum Outcome {
    Registered { place: PlaceRecord, added: bool },
    Notice(String),
}

/// Apply session updates for `period`, like a UI loop between keystrokes.
///
/// Returns the last suggestion list seen in that window.
async fn pump_for(session: &mut PlaceSession, period: Duration) -> Option<SuggestionsUpdated> {
    let deadline = sleep(period);
    tokio::pin!(deadline);
    let mut latest = None;
    loop {
        tokio::select! {
            _ = &mut deadline => return latest,
            updates = session.next() => {
                log_updates(&updates);
                for update in updates {
                    if let Update::Suggestions(list) = update {
                        latest = Some(list);
                    }
                }
            }
        }
    }
}

async fn wait_for_suggestions(session: &mut PlaceSession, query: &str) -> SuggestionsUpdated {
    loop {
        let updates = session.next().await;
        log_updates(&updates);
        for update in updates {
            if let Update::Suggestions(list) = update
                && list.query == query
            {
                return list;
            }
        }
    }
}

async fn wait_for_outcome(session: &mut PlaceSession) -> Outcome {
    loop {
        let updates = session.next().await;
        log_updates(&updates);
        let mut outcome = None;
        for update in updates {
            match update {
                Update::PlaceRegistered { place, added } => {
                    outcome = Some(Outcome::Registered { place, added })
                }
                Update::Notice(notice) => outcome = Some(Outcome::Notice(notice.message)),
                _ => {}
            }
        }
        if let Some(outcome) = outcome {
            return outcome;
        }
    }
}

fn log_updates(updates: &[Update]) {
    for update in updates {
        match update {
            Update::Suggestions(list) => tracing::debug!(
                query = %list.query,
                count = list.suggestions.len(),
                "Suggestions"
            ),
            Update::Viewport(change) => {
                let center = change.target().center();
                let animation_ms = match change {
                    ViewportChange::Set(_) => 0,
                    ViewportChange::Animate { duration, .. } => duration.as_millis() as u64,
                };
                tracing::info!(
                    lat = center.latitude(),
                    lon = center.longitude(),
                    animation_ms,
                    "Viewport moved"
                );
            }
            Update::PlaceRegistered { place, added } => {
                tracing::info!(id = %place.id, name = %place.name, added, "Place registered")
            }
            Update::Notice(notice) => tracing::warn!("{}", notice.message),
        }
    }
}
