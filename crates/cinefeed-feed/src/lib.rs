//! Feed logic for cinefeed.
//!
//! Holds the paging/search state machine, the promotion interleaver that
//! splices franchise spotlights into the result list, and the franchise
//! collection loader. Everything here talks to the catalog through
//! `cinefeed_api::tmdb::LocalCatalogApi`.

/// Feed facade combining the pager and spotlight arena.
pub mod feed;
/// Franchise id list and batched collection loader.
pub mod franchise;
/// Spotlight placement in the display sequence.
pub mod interleave;
/// Paging/search state machine.
pub mod pager;
/// Spotlight slot arena and resolution.
pub mod spotlight;

#[cfg(test)]
mod fake;

pub use feed::{Feed, FeedConfig};
pub use franchise::{FRANCHISE_MOVIE_IDS, FranchiseBatch, FranchiseCollection, MOVIES_PER_LOAD};
pub use interleave::{DisplayEntry, DisplayRow, PROMOTION_INTERVAL};
pub use pager::{BrowseMode, BrowseState, LoadStatus, PageRequest, Pager, RequestKind};
pub use spotlight::{SlotRequest, SlotStatus, SpotlightArena, SpotlightSlot};
