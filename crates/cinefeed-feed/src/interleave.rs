//! Spotlight placement in the display sequence.
//!
//! The layout depends only on the number of movies and the interval, so
//! appending movies never moves a spotlight that was already placed.

use cinefeed_api::tmdb::Movie;

use crate::spotlight::{SlotStatus, SpotlightArena};

/// Number of real movies between two spotlights.
pub const PROMOTION_INTERVAL: usize = 12;

/// One position of the display sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEntry {
    /// Index into the accumulated movie list.
    Movie(usize),
    /// Spotlight slot index (0, 1, 2, ... in order of appearance).
    Spotlight(usize),
}

/// Lays out `movie_count` movies with a spotlight after every `interval` of them.
///
/// A zero interval disables spotlights.
#[must_use]
pub fn layout(movie_count: usize, interval: usize) -> Vec<DisplayEntry> {
    let spotlights = movie_count.checked_div(interval).unwrap_or(0);
    let mut entries = Vec::with_capacity(movie_count.saturating_add(spotlights));
    let mut run = 0usize;
    let mut slot = 0usize;
    for index in 0..movie_count {
        entries.push(DisplayEntry::Movie(index));
        run = run.saturating_add(1);
        if run == interval {
            entries.push(DisplayEntry::Spotlight(slot));
            run = 0;
            slot = slot.saturating_add(1);
        }
    }
    entries
}

/// A display row handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRow<'a> {
    /// A real movie.
    Movie(&'a Movie),
    /// A franchise spotlight.
    Spotlight {
        /// Slot index.
        slot: usize,
        /// Resolution status at render time.
        status: SlotStatus,
        /// Resolved movies (empty until resolved).
        movies: &'a [Movie],
    },
}

/// Materializes `entries` against the movie list and the spotlight arena.
///
/// Slots missing from the arena render as `Unresolved` with no movies.
#[must_use]
pub fn display_rows<'a>(
    movies: &'a [Movie],
    entries: &[DisplayEntry],
    spotlights: &'a SpotlightArena,
) -> Vec<DisplayRow<'a>> {
    entries
        .iter()
        .filter_map(|entry| match *entry {
            DisplayEntry::Movie(index) => movies.get(index).map(DisplayRow::Movie),
            DisplayEntry::Spotlight(slot) => Some(spotlights.slot(slot).map_or(
                DisplayRow::Spotlight {
                    slot,
                    status: SlotStatus::Unresolved,
                    movies: &[],
                },
                |s| DisplayRow::Spotlight {
                    slot,
                    status: s.status(),
                    movies: s.movies(),
                },
            )),
        })
        .collect()
}
