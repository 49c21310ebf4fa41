//! Spotlight slot arena and resolution.
//!
//! Slot `s` shows `SPOTLIGHT_SIZE` franchise movies taken from a rotating
//! window over the franchise id list starting at `(s * SPOTLIGHT_SIZE) mod len`.
//! Slots live in a `Vec` indexed by slot number and are never recomputed
//! once resolved.
#![allow(clippy::future_not_send)]

use cinefeed_api::tmdb::{LocalCatalogApi, Movie};
use futures::future::{join_all, try_join_all};
use tracing::instrument;

use crate::franchise::FRANCHISE_MOVIE_IDS;
use crate::interleave::DisplayEntry;

/// Movies shown per spotlight.
pub const SPOTLIGHT_SIZE: usize = 3;

/// Search term used when the id lookups of a slot fail.
pub const FALLBACK_TERM: &str = "marvel";

/// Resolution status of a spotlight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    /// Not reached yet.
    #[default]
    Unresolved,
    /// Lookup in flight, or every lookup failed.
    Loading,
    /// Content fixed for the lifetime of the arena.
    Resolved,
}

/// One spotlight occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightSlot {
    index: usize,
    status: SlotStatus,
    movies: Vec<Movie>,
}

impl SpotlightSlot {
    /// Slot index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Resolution status.
    #[must_use]
    pub const fn status(&self) -> SlotStatus {
        self.status
    }

    /// Resolved movies (empty until resolved).
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }
}

/// Work order for resolving one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    /// Slot index.
    pub slot: usize,
    /// Franchise ids to look up.
    pub ids: Vec<u64>,
    /// Fallback search term.
    pub fallback_term: String,
    /// Maximum number of fallback results kept.
    pub limit: usize,
}

impl SlotRequest {
    /// Looks up every id concurrently; on any failure, substitutes the
    /// first `limit` results of one search for `fallback_term`.
    ///
    /// Returns `None` when the fallback fails too or finds nothing.
    #[instrument(skip_all, fields(slot = self.slot))]
    pub async fn resolve<A: LocalCatalogApi>(&self, api: &A) -> Option<Vec<Movie>> {
        let lookups = self.ids.iter().map(|id| api.movie_details(*id));
        match try_join_all(lookups).await {
            Ok(movies) => return Some(movies),
            Err(err) => {
                tracing::warn!(error = %err, "Spotlight lookup failed, falling back to search");
            }
        }

        match api.search_movies(&self.fallback_term, 1).await {
            Ok(page) if !page.results.is_empty() => {
                Some(page.results.into_iter().take(self.limit).collect())
            }
            Ok(_) => {
                tracing::warn!(term = %self.fallback_term, "Spotlight fallback search found nothing");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "Spotlight fallback search failed");
                None
            }
        }
    }
}

/// Resolves several slots concurrently.
pub async fn resolve_all<A: LocalCatalogApi>(
    api: &A,
    requests: &[SlotRequest],
) -> Vec<(usize, Option<Vec<Movie>>)> {
    join_all(requests.iter().map(|request| async move {
        (request.slot, request.resolve(api).await)
    }))
    .await
}

/// Picks the ids for `slot`: `per_slot` consecutive entries of `ids`,
/// wrapping around, starting at `(slot * per_slot) mod ids.len()`.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn select_ids(ids: &[u64], per_slot: usize, slot: usize) -> Vec<u64> {
    let len = ids.len();
    if len == 0 {
        return Vec::new();
    }
    // (a * b) mod n == ((a mod n) * (b mod n)) mod n, without overflow for large slots
    let start = ((slot % len) * (per_slot % len)) % len;
    (0..per_slot)
        .filter_map(|i| ids.get((start + i) % len))
        .copied()
        .collect()
}

/// Cache of spotlight slots for one feed.
#[derive(Debug, Clone)]
pub struct SpotlightArena {
    slots: Vec<SpotlightSlot>,
    ids: Vec<u64>,
    per_slot: usize,
    fallback_term: String,
}

impl Default for SpotlightArena {
    fn default() -> Self {
        Self::new(FRANCHISE_MOVIE_IDS.to_vec(), SPOTLIGHT_SIZE, FALLBACK_TERM)
    }
}

impl SpotlightArena {
    /// Creates an empty arena drawing from `ids`.
    #[must_use]
    pub fn new(ids: Vec<u64>, per_slot: usize, fallback_term: impl Into<String>) -> Self {
        Self {
            slots: Vec::new(),
            ids,
            per_slot,
            fallback_term: fallback_term.into(),
        }
    }

    /// Returns slot `index` if it has been reached.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&SpotlightSlot> {
        self.slots.get(index)
    }

    /// Number of slots reached so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot has been reached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Marks every unresolved spotlight in `entries` as loading and returns
    /// the resolution requests for them.
    pub fn claim(&mut self, entries: &[DisplayEntry]) -> Vec<SlotRequest> {
        let mut requests = Vec::new();
        for entry in entries {
            let DisplayEntry::Spotlight(index) = *entry else {
                continue;
            };
            while self.slots.len() <= index {
                let next = self.slots.len();
                self.slots.push(SpotlightSlot {
                    index: next,
                    status: SlotStatus::Unresolved,
                    movies: Vec::new(),
                });
            }
            let Some(slot) = self.slots.get_mut(index) else {
                continue;
            };
            if slot.status == SlotStatus::Unresolved {
                slot.status = SlotStatus::Loading;
                requests.push(SlotRequest {
                    slot: index,
                    ids: select_ids(&self.ids, self.per_slot, index),
                    fallback_term: self.fallback_term.clone(),
                    limit: self.per_slot,
                });
            }
        }
        if !requests.is_empty() {
            tracing::debug!(count = requests.len(), "Spotlight slots claimed");
        }
        requests
    }

    /// Records the outcome of a slot resolution.
    ///
    /// `None` leaves the slot loading. A slot that is already resolved
    /// keeps its content. Returns `true` if the slot became resolved.
    pub fn complete(&mut self, index: usize, outcome: Option<Vec<Movie>>) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::warn!(slot = index, "Completion for unknown spotlight slot");
            return false;
        };
        if slot.status == SlotStatus::Resolved {
            return false;
        }
        match outcome {
            Some(movies) => {
                tracing::debug!(slot = index, movies = movies.len(), "Spotlight resolved");
                slot.movies = movies;
                slot.status = SlotStatus::Resolved;
                true
            }
            None => {
                tracing::warn!(slot = index, "Spotlight left unresolved");
                false
            }
        }
    }
}
