//! SuggestionSearch - debounced autocomplete
//!
//! Every keystroke restarts a single debounce timer. When the timer fires, one
//! lookup is issued and tagged with the next value of a monotonic sequence. A
//! response is applied only if its tag is still the latest issued one and it was
//! made for the text currently in the box; anything else is dropped on arrival.
//! Lookups are never aborted once issued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{PlaceSearch, Result, SuggestionItem, runtime};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_LANGUAGE: &str = "ko";

/// Tuning for [`SuggestionSearch`]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup is issued
    pub debounce: Duration,
    /// Queries shorter than this (in characters, after trimming) never hit the network
    pub min_query_chars: usize,
    /// Language hint forwarded to the provider
    pub language: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// The suggestion list changed
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SuggestionsUpdated {
    /// Query the list belongs to
    pub query: String,
    pub suggestions: Vec<SuggestionItem>,
}

enum SearchEvent {
    Cleared {
        query: String,
    },
    Completed {
        tag: u64,
        query: String,
        result: Result<Vec<SuggestionItem>>,
    },
}

pub struct SuggestionSearch {
    places: Arc<dyn PlaceSearch>,
    config: SearchConfig,
    /// Text currently in the search box
    query: String,
    suggestions: Vec<SuggestionItem>,
    /// Pending debounce timer, if any
    timer: Option<JoinHandle<()>>,
    /// Latest issued tag. Bumped by every fired timer and every invalidation.
    issued: Arc<AtomicU64>,
    events_tx: mpsc::UnboundedSender<SearchEvent>,
    events_rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl SuggestionSearch {
    pub fn new(places: Arc<dyn PlaceSearch>, config: SearchConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            places,
            config,
            query: String::new(),
            suggestions: Vec::new(),
            timer: None,
            issued: Arc::new(AtomicU64::new(0)),
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Text currently in the search box
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The visible suggestion list
    pub fn suggestions(&self) -> &[SuggestionItem] {
        &self.suggestions
    }

    /// Feed a keystroke. Must be called from within a tokio runtime.
    pub fn on_query_changed(&mut self, text: &str) {
        #[cfg(feature = "profiling")]
        profiling::scope!("search::on_query_changed");

        self.cancel_timer();
        self.query = text.to_string();

        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.min_query_chars {
            self.clear_now();
            return;
        }

        let query = trimmed.to_string();
        let delay = self.config.debounce;
        let language = self.config.language.clone();
        let places = self.places.clone();
        let issued = self.issued.clone();
        let events_tx = self.events_tx.clone();

        self.timer = Some(runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            let tag = issued.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(tag, query = %query, "Issuing suggestion lookup");
            // Detached so a later keystroke cannot abort an issued request
            runtime::spawn(async move {
                let result = places.autocomplete(&query, &language).await;
                let _ = events_tx.send(SearchEvent::Completed { tag, query, result });
            });
        }));
    }

    /// Clear the list and forget in-flight lookups, keeping the query text
    pub fn dismiss(&mut self) {
        self.cancel_timer();
        self.clear_now();
    }

    /// Show `label` as the query (a suggestion was picked) without searching for it
    pub fn accept(&mut self, label: &str) {
        self.query = label.to_string();
        self.dismiss();
    }

    /// Wait for the next change of the suggestion list
    ///
    /// Cancel-safe: dropping the future loses no event.
    pub async fn next_update(&mut self) -> SuggestionsUpdated {
        loop {
            // `self` holds a sender, so the channel never closes
            let Some(event) = self.events_rx.recv().await else {
                return std::future::pending().await;
            };
            if let Some(update) = self.apply(event) {
                return update;
            }
        }
    }

    fn apply(&mut self, event: SearchEvent) -> Option<SuggestionsUpdated> {
        match event {
            SearchEvent::Cleared { query } => Some(SuggestionsUpdated {
                query,
                suggestions: Vec::new(),
            }),
            SearchEvent::Completed { tag, query, result } => {
                let latest = self.issued.load(Ordering::SeqCst);
                if tag != latest || query != self.query.trim() {
                    tracing::debug!(tag, latest, query = %query, "Discarding stale suggestions");
                    return None;
                }
                match result {
                    Ok(suggestions) => {
                        tracing::debug!(
                            tag,
                            count = suggestions.len(),
                            "Suggestions updated"
                        );
                        self.suggestions = suggestions;
                        Some(SuggestionsUpdated {
                            query,
                            suggestions: self.suggestions.clone(),
                        })
                    }
                    Err(e) => {
                        tracing::warn!(query = %query, "Suggestion lookup failed: {e}");
                        None
                    }
                }
            }
        }
    }

    /// Empty the list now and make every issued lookup stale
    fn clear_now(&mut self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.suggestions.clear();
        let _ = self.events_tx.send(SearchEvent::Cleared {
            query: self.query.clone(),
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SuggestionSearch {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
