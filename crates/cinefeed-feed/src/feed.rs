//! Feed facade combining the pager and the spotlight arena.
#![allow(clippy::future_not_send)]

use cinefeed_api::tmdb::{LocalCatalogApi, Movie};
use tracing::instrument;

use crate::franchise::FRANCHISE_MOVIE_IDS;
use crate::interleave::{self, DisplayEntry, DisplayRow, PROMOTION_INTERVAL};
use crate::pager::Pager;
use crate::spotlight::{self, FALLBACK_TERM, SPOTLIGHT_SIZE, SlotRequest, SpotlightArena};

/// Feed tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Real movies between two spotlights (0 disables spotlights).
    pub promotion_interval: usize,
    /// Movies per spotlight.
    pub spotlight_size: usize,
    /// Search term used when franchise lookups fail.
    pub fallback_term: String,
    /// Ids spotlights draw from.
    pub franchise_ids: Vec<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            promotion_interval: PROMOTION_INTERVAL,
            spotlight_size: SPOTLIGHT_SIZE,
            fallback_term: String::from(FALLBACK_TERM),
            franchise_ids: FRANCHISE_MOVIE_IDS.to_vec(),
        }
    }
}

/// A paged movie list with franchise spotlights spliced in.
///
/// The spotlight arena lives as long as the feed, so switching between
/// browse and search keeps slot content already shown.
#[derive(Debug)]
pub struct Feed {
    pager: Pager,
    spotlights: SpotlightArena,
    promotion_interval: usize,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

impl Feed {
    /// Creates an idle feed.
    #[must_use]
    pub fn new(config: FeedConfig) -> Self {
        Self {
            pager: Pager::new(),
            spotlights: SpotlightArena::new(
                config.franchise_ids,
                config.spotlight_size,
                config.fallback_term,
            ),
            promotion_interval: config.promotion_interval,
        }
    }

    /// Paging state machine.
    #[must_use]
    pub const fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Mutable paging state machine.
    pub const fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// Spotlight slots reached so far.
    #[must_use]
    pub const fn spotlights(&self) -> &SpotlightArena {
        &self.spotlights
    }

    /// Accumulated movies.
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        self.pager.state().movies()
    }

    /// Display sequence for the accumulated movies.
    #[must_use]
    pub fn layout(&self) -> Vec<DisplayEntry> {
        interleave::layout(self.movies().len(), self.promotion_interval)
    }

    /// Marks newly reached spotlights as loading and returns their requests.
    pub fn claim_spotlights(&mut self) -> Vec<SlotRequest> {
        let entries = self.layout();
        self.spotlights.claim(&entries)
    }

    /// Records the outcome of one spotlight resolution.
    pub fn complete_spotlight(&mut self, slot: usize, outcome: Option<Vec<Movie>>) -> bool {
        self.spotlights.complete(slot, outcome)
    }

    /// Rows ready for rendering.
    #[must_use]
    pub fn display_rows(&self) -> Vec<DisplayRow<'_>> {
        interleave::display_rows(self.movies(), &self.layout(), &self.spotlights)
    }

    /// Claims and resolves every reachable spotlight. Returns the number of
    /// slots that became resolved.
    #[instrument(skip_all)]
    pub async fn resolve_spotlights<A: LocalCatalogApi>(&mut self, api: &A) -> usize {
        let requests = self.claim_spotlights();
        if requests.is_empty() {
            return 0;
        }
        let mut resolved = 0usize;
        for (slot, outcome) in spotlight::resolve_all(api, &requests).await {
            if self.spotlights.complete(slot, outcome) {
                resolved = resolved.saturating_add(1);
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::fake::{FakeCatalog, movie, page};
    use crate::pager::BrowseMode;
    use crate::spotlight::SlotStatus;

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<u64> {
        range.collect()
    }

    fn small_config() -> FeedConfig {
        FeedConfig {
            promotion_interval: 12,
            spotlight_size: 3,
            fallback_term: String::from("marvel"),
            franchise_ids: vec![901, 902, 903, 904, 905, 906, 907],
        }
    }

    #[tokio::test]
    async fn test_thirty_movies_show_two_resolved_spotlights() {
        // Arrange
        let api = FakeCatalog::new()
            .with_discover(page(1, 2, &ids(1..=20)))
            .with_discover(page(2, 2, &ids(21..=30)))
            .with_details(&ids(901..=907));
        let mut feed = Feed::new(small_config());
        feed.pager_mut()
            .load_first_page(&api, BrowseMode::Browse, "")
            .await;
        feed.pager_mut().load_next_page(&api).await;

        // Act
        let resolved = feed.resolve_spotlights(&api).await;
        let rows = feed.display_rows();

        // Assert
        assert_eq!(resolved, 2);
        assert_eq!(rows.len(), 32);
        assert_eq!(
            rows[12],
            DisplayRow::Spotlight {
                slot: 0,
                status: SlotStatus::Resolved,
                movies: &[movie(901), movie(902), movie(903)],
            }
        );
        assert_eq!(
            rows[25],
            DisplayRow::Spotlight {
                slot: 1,
                status: SlotStatus::Resolved,
                movies: &[movie(904), movie(905), movie(906)],
            }
        );
        assert_eq!(rows[13], DisplayRow::Movie(&movie(13)));
    }

    #[tokio::test]
    async fn test_resolved_spotlight_survives_new_search() {
        // Arrange
        let api = FakeCatalog::new()
            .with_discover(page(1, 1, &ids(1..=12)))
            .with_search("iron", page(1, 1, &ids(101..=112)))
            .with_details(&ids(901..=907));
        let mut feed = Feed::new(small_config());
        feed.pager_mut()
            .load_first_page(&api, BrowseMode::Browse, "")
            .await;
        feed.resolve_spotlights(&api).await;
        let details_before = api.call_count("details");

        // Act
        feed.pager_mut().set_query("iron");
        feed.pager_mut().submit_search(&api).await;
        let resolved = feed.resolve_spotlights(&api).await;

        // Assert
        assert_eq!(resolved, 0);
        assert_eq!(api.call_count("details"), details_before);
        let slot = feed.spotlights().slot(0).unwrap();
        assert_eq!(slot.movies(), &[movie(901), movie(902), movie(903)]);
        assert_eq!(feed.display_rows()[0], DisplayRow::Movie(&movie(101)));
    }

    #[tokio::test]
    async fn test_layout_grows_without_moving_spotlights() {
        // Arrange
        let api = FakeCatalog::new()
            .with_discover(page(1, 2, &ids(1..=13)))
            .with_discover(page(2, 2, &ids(14..=26)));
        let mut feed = Feed::default();
        feed.pager_mut()
            .load_first_page(&api, BrowseMode::Browse, "")
            .await;
        let before = feed.layout();

        // Act
        feed.pager_mut().load_next_page(&api).await;
        let after = feed.layout();

        // Assert
        assert_eq!(&after[..before.len()], before.as_slice());
        assert_eq!(after[12], DisplayEntry::Spotlight(0));
        assert_eq!(after[25], DisplayEntry::Spotlight(1));
    }

    #[test]
    fn test_spotlights_disabled_with_zero_interval() {
        // Arrange
        let mut feed = Feed::new(FeedConfig {
            promotion_interval: 0,
            ..FeedConfig::default()
        });

        // Act
        let requests = feed.claim_spotlights();

        // Assert
        assert!(requests.is_empty());
        assert!(feed.spotlights().is_empty());
    }

    #[test]
    fn test_complete_spotlight_for_unclaimed_slot_is_ignored() {
        // Arrange
        let mut feed = Feed::default();

        // Act
        let resolved = feed.complete_spotlight(3, Some(vec![movie(1)]));

        // Assert
        assert!(!resolved);
        assert!(feed.spotlights().is_empty());
    }
}
