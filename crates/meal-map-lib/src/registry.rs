//! PlaceRegistry - the places picked during a session
//!
//! Insertion-ordered and unique by id. This is the only place duplicates are
//! filtered, so adding is idempotent no matter how resolutions interleave.

use std::collections::HashSet;

use crate::{PlaceRecord, Region};

/// Ordered set of place records, keyed by id
#[derive(Clone, Debug, Default)]
pub struct PlaceRegistry {
    /// Records in insertion order (the marker order)
    places: Vec<PlaceRecord>,
    /// Ids already present
    ids: HashSet<String>,
}

impl PlaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless its id is already registered
    ///
    /// Returns `true` if the registry changed.
    pub fn add(&mut self, record: PlaceRecord) -> bool {
        #[cfg(feature = "profiling")]
        profiling::scope!("registry::add");

        if !self.ids.insert(record.id.clone()) {
            tracing::debug!(id = %record.id, "Place already registered");
            return false;
        }
        self.places.push(record);
        true
    }

    /// Snapshot of all places for marker rendering
    #[inline]
    pub fn all(&self) -> &[PlaceRecord] {
        &self.places
    }

    pub fn get(&self, id: &str) -> Option<&PlaceRecord> {
        if !self.ids.contains(id) {
            return None;
        }
        self.places.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Places whose location falls inside `region`
    pub fn within(&self, region: Region) -> impl Iterator<Item = &PlaceRecord> {
        self.places
            .iter()
            .filter(move |p| region.contains(&p.location))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Drop everything (screen teardown)
    pub fn clear(&mut self) {
        self.places.clear();
        self.ids.clear();
    }
}
