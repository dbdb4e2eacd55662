//! PlaceSession - one "pick a place" screen
//!
//! The session owns every component and is the only code that mutates them.
//! Asynchronous work (location fetch, suggestion lookups, detail lookups) runs in
//! spawned tasks that report back over channels; [`PlaceSession::next`] applies
//! those reports one at a time and returns what the map view must do.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::location::{DEFAULT_DEVICE_SPAN, DEFAULT_LOCATION_TIMEOUT};
use crate::viewport::DEFAULT_ANIMATION;
use crate::{
    Coordinate, Error, Geolocation, InitialRegion, LocationProvider, PlaceRecord, PlaceRegistry,
    PlaceResolver, PlaceSearch, Region, Result, SearchConfig, SuggestionItem, SuggestionSearch,
    SuggestionsUpdated, ViewportChange, ViewportController, runtime,
};

/// Campus center used when the device location is not available
pub const CAMPUS_REGION: Region =
    Region::new_unchecked(Coordinate::new_unchecked(37.5583, 127.001), 0.005, 0.005);

/// Span (degrees) shown around a picked place, roughly street level
pub const DEFAULT_FOCUS_SPAN: f64 = 0.008;

/// Configuration for a [`PlaceSession`]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionConfig {
    pub search: SearchConfig,
    /// Bound on the initial position fetch
    pub location_timeout: Duration,
    /// Region shown before (or instead of) the device location
    pub fallback_region: Region,
    /// Span around the device fix
    pub device_span: f64,
    /// Span around a picked place
    pub focus_span: f64,
    /// Duration of the recentering animation
    pub animation: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            fallback_region: CAMPUS_REGION,
            device_span: DEFAULT_DEVICE_SPAN,
            focus_span: DEFAULT_FOCUS_SPAN,
            animation: DEFAULT_ANIMATION,
        }
    }
}

/// A message the user has to see
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub message: String,
    pub error: Error,
}

impl Notice {
    fn resolution_failed(suggestion: &SuggestionItem, error: Error) -> Self {
        Self {
            message: format!("Could not load \"{}\". Please pick it again.", suggestion.label),
            error,
        }
    }
}

/// Something the map view has to react to
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    Suggestions(SuggestionsUpdated),
    Viewport(ViewportChange),
    /// A resolved place went through the registry; `added` is false for duplicates
    PlaceRegistered { place: PlaceRecord, added: bool },
    Notice(Notice),
}

enum SessionEvent {
    Located(InitialRegion),
    Resolved {
        selection: u64,
        suggestion: SuggestionItem,
        result: Result<PlaceRecord>,
    },
}

pub struct PlaceSession {
    config: SessionConfig,
    search: SuggestionSearch,
    resolver: PlaceResolver,
    registry: PlaceRegistry,
    viewport: ViewportController,
    initial: Option<InitialRegion>,
    /// Tag of the latest selection
    selection: u64,
    /// Id of the place from the latest successful selection
    selected: Option<String>,
    location_task: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl PlaceSession {
    /// Open a session and start acquiring the device location.
    ///
    /// Must be called from within a tokio runtime. The viewport shows the
    /// fallback region until the location arrives.
    pub fn start(
        config: SessionConfig,
        geolocation: Arc<dyn Geolocation>,
        places: Arc<dyn PlaceSearch>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let provider = LocationProvider::new(geolocation, config.fallback_region)
            .with_timeout(config.location_timeout)
            .with_span(config.device_span);
        let viewport = ViewportController::new(provider.fallback());
        let location_tx = events_tx.clone();
        let location_task = runtime::spawn(async move {
            let initial = provider.acquire().await;
            let _ = location_tx.send(SessionEvent::Located(initial));
        });

        tracing::info!(
            debounce_ms = config.search.debounce.as_millis() as u64,
            language = %config.search.language,
            "Place session started"
        );

        Self {
            search: SuggestionSearch::new(places.clone(), config.search.clone()),
            resolver: PlaceResolver::new(places, config.search.language.clone()),
            registry: PlaceRegistry::new(),
            viewport,
            initial: None,
            selection: 0,
            selected: None,
            location_task: Some(location_task),
            events_tx,
            events_rx,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Text in the search box
    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn suggestions(&self) -> &[SuggestionItem] {
        self.search.suggestions()
    }

    /// All registered places, in marker order
    pub fn markers(&self) -> &[PlaceRecord] {
        self.registry.all()
    }

    /// Registered places inside the frame drawn at `now`
    pub fn visible_markers(&self, now: Instant) -> Vec<&PlaceRecord> {
        self.registry.within(self.viewport.region_at(now)).collect()
    }

    /// The place of the latest successful selection
    pub fn selected(&self) -> Option<&PlaceRecord> {
        self.selected.as_deref().and_then(|id| self.registry.get(id))
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// How the initial region was obtained, once known
    pub fn initial_region(&self) -> Option<&InitialRegion> {
        self.initial.as_ref()
    }

    /// Feed a keystroke from the search box
    pub fn on_query_changed(&mut self, text: &str) {
        self.search.on_query_changed(text);
    }

    /// The user picked `suggestion` from the list
    ///
    /// The query text becomes the suggestion label, the list is dismissed and the
    /// place is resolved in the background. Returns the selection tag.
    pub fn select(&mut self, suggestion: &SuggestionItem) -> u64 {
        #[cfg(feature = "profiling")]
        profiling::scope!("session::select");

        self.selection += 1;
        let selection = self.selection;
        self.search.accept(&suggestion.label);

        tracing::debug!(selection, id = %suggestion.id, "Resolving selected place");
        let resolver = self.resolver.clone();
        let suggestion = suggestion.clone();
        let events_tx = self.events_tx.clone();
        runtime::spawn(async move {
            let result = resolver.resolve(&suggestion).await;
            let _ = events_tx.send(SessionEvent::Resolved {
                selection,
                suggestion,
                result,
            });
        });
        selection
    }

    /// Wait for the next batch of updates
    ///
    /// Cancel-safe, so it can sit in a `select!` next to UI input.
    pub async fn next(&mut self) -> Vec<Update> {
        loop {
            tokio::select! {
                update = self.search.next_update() => {
                    return vec![Update::Suggestions(update)];
                }
                Some(event) = self.events_rx.recv() => {
                    let updates = self.apply(event);
                    if !updates.is_empty() {
                        return updates;
                    }
                }
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Vec<Update> {
        match event {
            SessionEvent::Located(initial) => self.apply_location(initial),
            SessionEvent::Resolved {
                selection,
                suggestion,
                result,
            } => self.apply_resolution(selection, &suggestion, result),
        }
    }

    fn apply_location(&mut self, initial: InitialRegion) -> Vec<Update> {
        self.location_task = None;
        let region = initial.region;
        self.initial = Some(initial);

        // A picked place already moved the camera; the late fix must not undo that
        if self.viewport.changes() > 0 {
            tracing::debug!("Location arrived after the viewport moved; keeping it");
            return Vec::new();
        }
        vec![Update::Viewport(self.viewport.set_region(region))]
    }

    fn apply_resolution(
        &mut self,
        selection: u64,
        suggestion: &SuggestionItem,
        result: Result<PlaceRecord>,
    ) -> Vec<Update> {
        let place = match result {
            Ok(place) => place,
            Err(e) => {
                tracing::warn!(id = %suggestion.id, "Place resolution failed: {e}");
                return vec![Update::Notice(Notice::resolution_failed(suggestion, e))];
            }
        };

        let added = self.registry.add(place.clone());
        let mut updates = Vec::with_capacity(2);

        if selection == self.selection {
            self.selected = Some(place.id.clone());
            match Region::around(place.location, self.config.focus_span) {
                Ok(region) => updates.push(Update::Viewport(
                    self.viewport.animate_to(region, self.config.animation),
                )),
                Err(e) => tracing::warn!("Not recentering on {}: {e}", place.id),
            }
        } else {
            tracing::debug!(
                selection,
                latest = self.selection,
                "Resolution for an older selection; not recentering"
            );
        }

        updates.insert(0, Update::PlaceRegistered { place, added });
        updates
    }
}

impl Drop for PlaceSession {
    fn drop(&mut self) {
        if let Some(task) = self.location_task.take() {
            task.abort();
        }
    }
}
