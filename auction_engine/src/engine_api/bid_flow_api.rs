use std::fmt::Debug;

use ah_common::Money;
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{Auction, AuctionId, AuctionStatus, NewAuction, NewBid, UserId},
    engine_api::{
        bid_validator::{validate_bid, BidRejection},
        errors::BidFlowError,
    },
    traits::{AuctionStore, AuctionStoreError},
};

/// The maximum number of read-validate-write attempts a single bid submission makes before giving up with
/// [`BidFlowError::Contention`]. Keeps hot auctions from turning into unbounded retry storms.
pub const MAX_BID_ATTEMPTS: usize = 5;

/// `BidFlowApi` is the primary API for handling bid submissions and auction lifecycle transitions.
///
/// It owns the read-validate-write cycle for a single bid: read a snapshot, validate the candidate bid against it,
/// then commit a conditional write that only succeeds if the record is unchanged since the snapshot. A failed
/// condition means another bid (or a lifecycle transition) committed first; the cycle restarts from a fresh read, at
/// most [`MAX_BID_ATTEMPTS`] times. This is what prevents the lost-update race where two concurrent higher bids both
/// read the same stale current bid and both believe they are the new leader.
pub struct BidFlowApi<B> {
    db: B,
}

impl<B> Debug for BidFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BidFlowApi")
    }
}

impl<B> BidFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> BidFlowApi<B>
where B: AuctionStore
{
    /// Creates a new auction for the given owner.
    ///
    /// Field validation happens here because these fields feed the bidding invariants: the starting price must be
    /// positive (it doubles as the initial current-bid amount) and the deadline must lie in the future.
    pub async fn create_auction(&self, auction: NewAuction, now: DateTime<Utc>) -> Result<Auction, BidFlowError> {
        if auction.title.trim().is_empty() {
            return Err(BidFlowError::InvalidAuction("title must not be empty".to_string()));
        }
        if auction.description.trim().is_empty() {
            return Err(BidFlowError::InvalidAuction("description must not be empty".to_string()));
        }
        if !auction.starting_price.is_positive() {
            return Err(BidFlowError::InvalidAuction("starting price must be positive".to_string()));
        }
        if auction.end_time <= now {
            return Err(BidFlowError::InvalidAuction("end time must be in the future".to_string()));
        }
        let auction = self.db.insert_auction(auction, now).await?;
        debug!("🔨️📦️ Auction [{}] created by {} with starting price {}", auction.auction_id, auction.owner,
            auction.starting_price);
        Ok(auction)
    }

    /// Submits a bid against the auction identified by `auction_id`.
    ///
    /// The algorithm per attempt:
    /// 1. Read the auction snapshot (`NotFound` if absent).
    /// 2. Validate the candidate bid against the snapshot. A validation failure is permanent and returned as-is,
    ///    except that `AuctionExpired` first triggers the lazy `Active → Ended` transition (§ lifecycle) so that no
    ///    later caller sees a stale `Active` record.
    /// 3. Commit the conditional write: current-bid update plus history append, conditioned on the snapshot's
    ///    version. On a write conflict, restart from step 1.
    ///
    /// After [`MAX_BID_ATTEMPTS`] conflicts the submission fails with [`BidFlowError::Contention`], which is
    /// transient: the caller may retry. On success, exactly one history entry has been durably appended and the
    /// current bid updated; on any failure the record is unchanged by this call (aside from a due expiry transition).
    pub async fn place_bid(
        &self,
        auction_id: &AuctionId,
        bidder: UserId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidFlowError> {
        let bid = NewBid::new(bidder, amount);
        for attempt in 1..=MAX_BID_ATTEMPTS {
            let auction = self
                .db
                .fetch_auction(auction_id)
                .await?
                .ok_or_else(|| BidFlowError::NotFound(auction_id.clone()))?;
            if let Err(reason) = validate_bid(&auction, &bid, now) {
                if reason == BidRejection::AuctionExpired {
                    apply_lazy_expiry(&self.db, &auction, now).await?;
                }
                trace!("🔨️💰️ Bid of {amount} on [{auction_id}] by {} rejected: {reason}", bid.bidder);
                return Err(reason.into());
            }
            match self.db.commit_bid(auction_id, &bid, now, auction.version).await {
                Ok(updated) => {
                    debug!(
                        "🔨️💰️ Bid of {amount} on [{auction_id}] by {} accepted on attempt {attempt}. Current bid \
                         is now {}",
                        bid.bidder, updated.current_bid_amount
                    );
                    return Ok(updated);
                },
                Err(AuctionStoreError::WriteConflict) => {
                    trace!("🔨️💰️ Bid of {amount} on [{auction_id}] lost the write race on attempt {attempt}");
                    continue;
                },
                Err(e) => return Err(e.into()),
            }
        }
        info!("🔨️💰️ Bid of {amount} on [{auction_id}] abandoned after {MAX_BID_ATTEMPTS} write conflicts");
        Err(BidFlowError::Contention)
    }

    /// Explicitly ends an auction. Only the owner may do this.
    ///
    /// Preconditions are checked in order: the auction must exist, the requester must be the owner
    /// (`NotAuthorized` otherwise), and the auction must still be `Active` (`AlreadyFinal` otherwise). An auction
    /// whose deadline has already passed can still be closed by its owner; it ends up `Ended` either way.
    pub async fn close_auction(
        &self,
        auction_id: &AuctionId,
        requester: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidFlowError> {
        self.finalize(auction_id, requester, AuctionStatus::Ended, now).await
    }

    /// Cancels an auction. Only the owner may do this, and only while the auction is `Active`.
    /// A cancelled auction blocks further bids exactly like an ended one.
    pub async fn cancel_auction(
        &self,
        auction_id: &AuctionId,
        requester: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidFlowError> {
        self.finalize(auction_id, requester, AuctionStatus::Cancelled, now).await
    }

    async fn finalize(
        &self,
        auction_id: &AuctionId,
        requester: &UserId,
        new_status: AuctionStatus,
        now: DateTime<Utc>,
    ) -> Result<Auction, BidFlowError> {
        let auction = self
            .db
            .fetch_auction(auction_id)
            .await?
            .ok_or_else(|| BidFlowError::NotFound(auction_id.clone()))?;
        if &auction.owner != requester {
            debug!("🔨️🔒️ {requester} tried to finalise [{auction_id}], which belongs to {}", auction.owner);
            return Err(BidFlowError::NotAuthorized);
        }
        if auction.status.is_final() {
            return Err(BidFlowError::AlreadyFinal);
        }
        match self.db.finalize_auction(auction_id, new_status, now).await {
            Ok(updated) => {
                debug!("🔨️🏁️ Auction [{auction_id}] moved to {new_status} by {requester}");
                Ok(updated)
            },
            // The only way the conditional write can fail after the checks above is a concurrent transition
            // (another close, a cancel, or a lazy expiry) winning the race.
            Err(AuctionStoreError::WriteConflict) => Err(BidFlowError::AlreadyFinal),
            Err(e) => Err(e.into()),
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// Applies the implicit `Active → Ended` transition for an auction whose deadline has passed.
///
/// Returns the record as it stands after the transition. Idempotent under races: if a concurrent observer
/// performed the transition first, the conditional write conflicts and the fresh record is returned instead.
/// No background scheduler exists; this runs whenever an access observes a due deadline.
pub(crate) async fn apply_lazy_expiry<B: AuctionStore>(
    db: &B,
    auction: &Auction,
    now: DateTime<Utc>,
) -> Result<Auction, BidFlowError> {
    if auction.status != AuctionStatus::Active || !auction.is_past_deadline(now) {
        return Ok(auction.clone());
    }
    match db.finalize_auction(&auction.auction_id, AuctionStatus::Ended, now).await {
        Ok(updated) => {
            debug!("🔨️🕰️ Auction [{}] passed its deadline and was marked Ended", auction.auction_id);
            Ok(updated)
        },
        Err(AuctionStoreError::WriteConflict) => {
            trace!("🔨️🕰️ Lazy expiry of [{}] already applied by a concurrent observer", auction.auction_id);
            let fresh = db
                .fetch_auction(&auction.auction_id)
                .await?
                .ok_or_else(|| BidFlowError::NotFound(auction.auction_id.clone()))?;
            Ok(fresh)
        },
        Err(e) => Err(e.into()),
    }
}
