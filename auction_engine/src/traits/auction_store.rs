use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{Auction, AuctionId, AuctionStatus, BidEntry, NewAuction, NewBid, UserId};

/// The `AuctionStore` trait defines the behaviour backends must expose to persist auction records.
///
/// The store provides keyed reads and *conditional* writes. A conditional write only commits if the precondition on
/// the stored record still holds; when it does not, the backend must return [`AuctionStoreError::WriteConflict`] and
/// leave the record entirely unchanged. The engine relies on this to serialise concurrent mutations of a single
/// auction without any locks: different auctions never contend, and racing writers to the same auction converge by
/// re-reading.
#[allow(async_fn_in_trait)]
pub trait AuctionStore {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Stores a brand-new auction record with `Active` status, a fresh auction id, and the current bid initialised
    /// to the starting price with no bidder. Field validation is the caller's responsibility.
    async fn insert_auction(&self, auction: NewAuction, now: DateTime<Utc>) -> Result<Auction, AuctionStoreError>;

    /// Fetches the auction with the given public id, or `None` if it does not exist.
    async fn fetch_auction(&self, auction_id: &AuctionId) -> Result<Option<Auction>, AuctionStoreError>;

    /// Fetches the append-only bid history for the auction, in submission order.
    async fn fetch_bid_history(&self, auction_id: &AuctionId) -> Result<Vec<BidEntry>, AuctionStoreError>;

    /// Atomically commits an accepted bid: updates the current bid to `(bid.amount, bid.bidder, now)` and appends a
    /// history entry, in a single transaction, conditioned on the record still being `Active` at `expected_version`.
    ///
    /// If the condition fails (a concurrent bid or a lifecycle transition got there first), the transaction is rolled
    /// back, nothing is applied, and `WriteConflict` is returned. The caller re-reads and re-validates.
    async fn commit_bid(
        &self,
        auction_id: &AuctionId,
        bid: &NewBid,
        now: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<Auction, AuctionStoreError>;

    /// Moves an `Active` auction into the given terminal state, conditioned on the record still being `Active`.
    ///
    /// This single primitive backs owner-triggered closes, owner-triggered cancellations, and lazy expiry. Because
    /// the precondition is on the status alone, any number of concurrent observers racing to expire the same auction
    /// converge on exactly one `Ended` write; the losers see `WriteConflict` and re-read the (now final) record.
    async fn finalize_auction(
        &self,
        auction_id: &AuctionId,
        new_status: AuctionStatus,
        now: DateTime<Utc>,
    ) -> Result<Auction, AuctionStoreError>;

    /// Fetches auctions that are `Active` with a deadline after `now`, newest first.
    async fn fetch_active_auctions(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, AuctionStoreError>;

    /// Fetches all auctions created by the given owner, newest first.
    async fn fetch_auctions_for_owner(&self, owner: &UserId) -> Result<Vec<Auction>, AuctionStoreError>;

    /// Fetches all auctions that have at least one history entry from the given bidder, newest first.
    async fn fetch_auctions_with_bids_from(&self, bidder: &UserId) -> Result<Vec<Auction>, AuctionStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), AuctionStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuctionStoreError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested auction {0} does not exist")]
    AuctionNotFound(AuctionId),
    #[error("Cannot insert auction, since it already exists with id {0}")]
    DuplicateAuction(AuctionId),
    #[error("The conditional write lost a race to a concurrent writer")]
    WriteConflict,
    #[error("{0} is not a valid terminal status for an auction")]
    InvalidFinalStatus(AuctionStatus),
}

impl From<sqlx::Error> for AuctionStoreError {
    fn from(e: sqlx::Error) -> Self {
        AuctionStoreError::DatabaseError(e.to_string())
    }
}
