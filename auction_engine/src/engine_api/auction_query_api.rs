//! Read-side views over auction records.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{Auction, AuctionId, FullAuction, UserId},
    engine_api::{bid_flow_api::apply_lazy_expiry, errors::BidFlowError},
    traits::AuctionStore,
};

/// The `AuctionQueryApi` provides the read-side projections: a single auction with its bid history, the active
/// listing, and the per-identity listings. It enforces no invariants of its own, but single-record reads apply the
/// same lazy-expiry transition as the bid flow, so a caller never makes a decision (such as showing a bid form)
/// against a stale `Active` status it fetched in the same request.
pub struct AuctionQueryApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuctionQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuctionQueryApi ({:?})", self.db)
    }
}

impl<B> AuctionQueryApi<B>
where B: AuctionStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches a single auction with its full bid history, applying lazy expiry first when the deadline has passed.
    /// Repeated calls after the deadline keep returning `Ended`; the transition never reverts.
    pub async fn auction(&self, auction_id: &AuctionId, now: DateTime<Utc>) -> Result<FullAuction, BidFlowError> {
        let auction = self
            .db
            .fetch_auction(auction_id)
            .await?
            .ok_or_else(|| BidFlowError::NotFound(auction_id.clone()))?;
        let auction = apply_lazy_expiry(&self.db, &auction, now).await?;
        let bids = self.db.fetch_bid_history(auction_id).await?;
        trace!("🔨️🔍️ Fetched auction [{auction_id}] with {} bids", bids.len());
        Ok(FullAuction { auction, bids })
    }

    /// Lists auctions that are open for bidding at `now`, newest first. Records whose deadline has passed are
    /// filtered out here rather than rewritten; their `Ended` transition is applied when they are next accessed
    /// individually.
    pub async fn active_auctions(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, BidFlowError> {
        let auctions = self.db.fetch_active_auctions(now).await?;
        Ok(auctions)
    }

    /// Lists all auctions created by the given identity, newest first, in any lifecycle state.
    pub async fn auctions_for_owner(&self, owner: &UserId) -> Result<Vec<Auction>, BidFlowError> {
        let auctions = self.db.fetch_auctions_for_owner(owner).await?;
        Ok(auctions)
    }

    /// Lists all auctions the given identity has bid on (membership test against each record's bid history),
    /// newest first.
    pub async fn auctions_with_bids_from(&self, bidder: &UserId) -> Result<Vec<Auction>, BidFlowError> {
        let auctions = self.db.fetch_auctions_with_bids_from(bidder).await?;
        Ok(auctions)
    }
}
