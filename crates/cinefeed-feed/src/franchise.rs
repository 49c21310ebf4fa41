//! Franchise id list and batched collection loader.
#![allow(clippy::future_not_send)]

use std::cmp::Reverse;

use cinefeed_api::tmdb::{CatalogError, LocalCatalogApi, Movie};
use futures::future::try_join_all;
use tracing::instrument;

use crate::pager::LoadStatus;

/// Marvel Cinematic Universe theatrical releases in release order.
pub const FRANCHISE_MOVIE_IDS: [u64; 33] = [
    // Phase One
    1726,  // Iron Man
    1724,  // The Incredible Hulk
    10138, // Iron Man 2
    10195, // Thor
    1771,  // Captain America: The First Avenger
    24428, // The Avengers
    // Phase Two
    68721,  // Iron Man 3
    76338,  // Thor: The Dark World
    100402, // Captain America: The Winter Soldier
    118340, // Guardians of the Galaxy
    99861,  // Avengers: Age of Ultron
    102899, // Ant-Man
    // Phase Three
    271110, // Captain America: Civil War
    284052, // Doctor Strange
    283995, // Guardians of the Galaxy Vol. 2
    315635, // Spider-Man: Homecoming
    284053, // Thor: Ragnarok
    284054, // Black Panther
    299536, // Avengers: Infinity War
    363088, // Ant-Man and the Wasp
    299537, // Captain Marvel
    299534, // Avengers: Endgame
    429617, // Spider-Man: Far From Home
    // Phase Four
    497698, // Black Widow
    566525, // Shang-Chi and the Legend of the Ten Rings
    524434, // Eternals
    634649, // Spider-Man: No Way Home
    453395, // Doctor Strange in the Multiverse of Madness
    616037, // Thor: Love and Thunder
    505642, // Black Panther: Wakanda Forever
    // Phase Five
    640146, // Ant-Man and the Wasp: Quantumania
    447365, // Guardians of the Galaxy Vol. 3
    609681, // The Marvels
];

/// Ids fetched per `load_more` call.
pub const MOVIES_PER_LOAD: usize = 6;

/// User-facing message shown when a batch fails.
pub const FRANCHISE_ERROR_MESSAGE: &str = "Failed to load franchise movies";

/// One issued batch of id lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FranchiseBatch {
    /// Index of the first id of the batch.
    pub start: usize,
    /// Ids to look up.
    pub ids: Vec<u64>,
}

impl FranchiseBatch {
    /// Looks up every id of the batch concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first catalog error; the whole batch fails together.
    pub async fn fetch<A: LocalCatalogApi>(&self, api: &A) -> Result<Vec<Movie>, CatalogError> {
        try_join_all(self.ids.iter().map(|id| api.movie_details(*id))).await
    }
}

/// Franchise collection loaded in fixed-size batches.
#[derive(Debug, Clone)]
pub struct FranchiseCollection {
    ids: Vec<u64>,
    batch_size: usize,
    movies: Vec<Movie>,
    next_index: usize,
    status: LoadStatus,
    error_message: Option<String>,
}

impl Default for FranchiseCollection {
    fn default() -> Self {
        Self::new(FRANCHISE_MOVIE_IDS.to_vec(), MOVIES_PER_LOAD)
    }
}

impl FranchiseCollection {
    /// Creates an empty collection over `ids`.
    #[must_use]
    pub fn new(ids: Vec<u64>, batch_size: usize) -> Self {
        Self {
            ids,
            batch_size: batch_size.max(1),
            movies: Vec::new(),
            next_index: 0,
            status: LoadStatus::Idle,
            error_message: None,
        }
    }

    /// Movies loaded so far, in id-list order.
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Loaded movies ordered by release date, newest first; undated last.
    #[must_use]
    pub fn sorted_by_release(&self) -> Vec<&Movie> {
        let mut sorted: Vec<&Movie> = self.movies.iter().collect();
        sorted.sort_by_key(|m| Reverse(m.release_date));
        sorted
    }

    /// Total number of ids in the collection.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ids.len()
    }

    /// Whether every id has been loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_index >= self.ids.len()
    }

    /// Current load status.
    #[must_use]
    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    /// Message of the last failure.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Issues the next batch, or `None` when complete or a batch is in flight.
    pub fn begin_batch(&mut self) -> Option<FranchiseBatch> {
        if self.status == LoadStatus::Loading || self.is_complete() {
            return None;
        }
        let end = self
            .next_index
            .saturating_add(self.batch_size)
            .min(self.ids.len());
        let ids = self.ids.get(self.next_index..end)?.to_vec();
        self.status = LoadStatus::Loading;
        Some(FranchiseBatch {
            start: self.next_index,
            ids,
        })
    }

    /// Applies a batch outcome. Failures keep the loaded movies and leave the
    /// cursor in place so the same batch can be requested again.
    pub fn complete_batch(
        &mut self,
        batch: &FranchiseBatch,
        result: Result<Vec<Movie>, CatalogError>,
    ) {
        match result {
            Ok(movies) => {
                self.movies.extend(movies);
                self.next_index = batch.start.saturating_add(batch.ids.len());
                self.status = LoadStatus::Success;
                self.error_message = None;
                tracing::info!(
                    loaded = self.next_index,
                    total = self.ids.len(),
                    "Franchise batch loaded"
                );
            }
            Err(err) => {
                tracing::warn!(start = batch.start, error = %err, "Franchise batch failed");
                self.status = LoadStatus::Error;
                self.error_message = Some(String::from(FRANCHISE_ERROR_MESSAGE));
            }
        }
    }

    /// Loads the next batch. Returns `false` if nothing was requested.
    #[instrument(skip_all)]
    pub async fn load_more<A: LocalCatalogApi>(&mut self, api: &A) -> bool {
        let Some(batch) = self.begin_batch() else {
            return false;
        };
        let result = batch.fetch(api).await;
        self.complete_batch(&batch, result);
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::fake::{FakeCatalog, movie};

    #[test]
    fn test_franchise_ids_are_unique() {
        // Arrange & Act
        let unique: HashSet<u64> = FRANCHISE_MOVIE_IDS.iter().copied().collect();

        // Assert
        assert_eq!(unique.len(), FRANCHISE_MOVIE_IDS.len());
    }

    #[tokio::test]
    async fn test_load_more_in_batches_until_complete() {
        // Arrange
        let ids: Vec<u64> = (1..=8).collect();
        let api = FakeCatalog::new().with_details(&ids);
        let mut collection = FranchiseCollection::new(ids, 6);

        // Act
        let first = collection.load_more(&api).await;
        let loaded_after_first = collection.movies().len();
        let second = collection.load_more(&api).await;
        let third = collection.load_more(&api).await;

        // Assert
        assert!(first && second && !third);
        assert_eq!(loaded_after_first, 6);
        assert_eq!(collection.movies().len(), 8);
        assert!(collection.is_complete());
        assert_eq!(api.call_count("details"), 8);
    }

    #[test]
    fn test_begin_batch_rejected_while_loading() {
        // Arrange
        let mut collection = FranchiseCollection::default();
        let _in_flight = collection.begin_batch().unwrap();

        // Act
        let second = collection.begin_batch();

        // Assert
        assert!(second.is_none());
        assert_eq!(collection.status(), LoadStatus::Loading);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_movies_and_cursor() {
        // Arrange: id 9 in the second batch is unknown
        let api = FakeCatalog::new().with_details(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut collection = FranchiseCollection::new((1..=9).collect(), 6);
        collection.load_more(&api).await;

        // Act
        collection.load_more(&api).await;

        // Assert
        assert_eq!(collection.status(), LoadStatus::Error);
        assert_eq!(collection.error_message(), Some(FRANCHISE_ERROR_MESSAGE));
        assert_eq!(collection.movies().len(), 6);
        assert!(!collection.is_complete());
        assert_eq!(collection.begin_batch().unwrap().start, 6);
    }

    #[test]
    fn test_sorted_by_release_newest_first() {
        // Arrange
        let mut collection = FranchiseCollection::new(vec![1, 2, 3], 6);
        let batch = collection.begin_batch().unwrap();
        let dated = |id, year| Movie {
            release_date: NaiveDate::from_ymd_opt(year, 5, 1),
            ..movie(id)
        };
        collection.complete_batch(&batch, Ok(vec![dated(1, 2008), movie(2), dated(3, 2019)]));

        // Act
        let order: Vec<u64> = collection
            .sorted_by_release()
            .iter()
            .map(|m| m.id)
            .collect();

        // Assert
        assert_eq!(order, vec![3, 1, 2]);
    }
}
