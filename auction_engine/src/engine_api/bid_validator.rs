//! Pure validation of candidate bids against an auction snapshot.
//!
//! The checks run in a fixed order and the first failing rule determines the rejection reason. Validation has no
//! side effects; in particular, observing a passed deadline does *not* transition the record here. The caller
//! (the bid flow coordinator) is responsible for triggering the expiry transition when it sees `AuctionExpired`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{Auction, NewBid};

/// The reasons a candidate bid can be rejected. All of these are permanent for the given input and auction state;
/// none of them is ever retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BidRejection {
    #[error("The auction is no longer active")]
    AuctionNotActive,
    #[error("The auction deadline has passed")]
    AuctionExpired,
    #[error("You cannot bid on your own auction")]
    OwnerCannotBid,
    #[error("Bid must be higher than the current bid")]
    BidTooLow,
    #[error("Bid amount must be a positive amount")]
    InvalidAmount,
}

/// Checks a candidate bid against the auction snapshot, with the wall-clock time supplied explicitly.
///
/// Rules, in order:
/// 1. The auction must be `Active`.
/// 2. The deadline must not have passed. A failure here means the snapshot is stale and the caller should apply the
///    lazy-expiry transition.
/// 3. The bidder must not be the auction's owner.
/// 4. The amount must strictly exceed the current bid. Equal amounts are rejected; ties never win.
/// 5. The amount must be positive.
pub fn validate_bid(auction: &Auction, bid: &NewBid, now: DateTime<Utc>) -> Result<(), BidRejection> {
    if auction.status.is_final() {
        return Err(BidRejection::AuctionNotActive);
    }
    if auction.is_past_deadline(now) {
        return Err(BidRejection::AuctionExpired);
    }
    if bid.bidder == auction.owner {
        return Err(BidRejection::OwnerCannotBid);
    }
    if bid.amount <= auction.current_bid_amount {
        return Err(BidRejection::BidTooLow);
    }
    if !bid.amount.is_positive() {
        return Err(BidRejection::InvalidAmount);
    }
    Ok(())
}
