//! `SqliteDatabase` is a concrete implementation of an auction engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the traits defined in the [`crate::traits`] module.
//! The conditional writes are expressed directly as guarded `UPDATE` statements, so the compare step and the write
//! happen in a single statement on the database side.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{auctions, bids, db_url, new_pool, users};
use crate::{
    db_types::{Auction, AuctionId, AuctionStatus, BidEntry, NewAuction, NewBid, UserCredentials, UserId},
    traits::{AuctionStore, AuctionStoreError, AuthApiError, UserAuth},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool using the `AH_DATABASE_URL` environment variable, or the default URL.
    pub async fn new(max_connections: u32) -> Result<Self, AuctionStoreError> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, AuctionStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AuctionStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_auction(&self, auction: NewAuction, now: DateTime<Utc>) -> Result<Auction, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let auction = auctions::insert_auction(auction, now, &mut conn).await?;
        debug!("🗃️ Auction [{}] saved in the DB with row id {}", auction.auction_id, auction.id);
        Ok(auction)
    }

    async fn fetch_auction(&self, auction_id: &AuctionId) -> Result<Option<Auction>, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let auction = auctions::fetch_auction_by_id(auction_id, &mut conn).await?;
        Ok(auction)
    }

    async fn fetch_bid_history(&self, auction_id: &AuctionId) -> Result<Vec<BidEntry>, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let auction = auctions::fetch_auction_by_id(auction_id, &mut conn)
            .await?
            .ok_or_else(|| AuctionStoreError::AuctionNotFound(auction_id.clone()))?;
        let history = bids::fetch_bids_for_auction(auction.id, &mut conn).await?;
        Ok(history)
    }

    /// The current-bid update and the history append happen in one transaction. If the conditional update misses
    /// (the record moved on since the caller's snapshot), the transaction rolls back without appending anything,
    /// so a losing bid is never visible in the history.
    async fn commit_bid(
        &self,
        auction_id: &AuctionId,
        bid: &NewBid,
        now: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<Auction, AuctionStoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = auctions::conditional_bid_update(auction_id, bid, now, expected_version, &mut tx).await?;
        let auction = match updated {
            Some(auction) => auction,
            None => {
                tx.rollback().await?;
                return Err(AuctionStoreError::WriteConflict);
            },
        };
        let entry = bids::append_bid(auction.id, bid, now, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Bid #{} of {} by {} committed on auction [{auction_id}] (version {} -> {})",
            entry.id, bid.amount, bid.bidder, expected_version, auction.version
        );
        Ok(auction)
    }

    async fn finalize_auction(
        &self,
        auction_id: &AuctionId,
        new_status: AuctionStatus,
        now: DateTime<Utc>,
    ) -> Result<Auction, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let updated = auctions::conditional_finalize(auction_id, new_status, now, &mut conn).await?;
        match updated {
            Some(auction) => {
                debug!("🗃️ Auction [{auction_id}] finalised as {new_status}");
                Ok(auction)
            },
            None => Err(AuctionStoreError::WriteConflict),
        }
    }

    async fn fetch_active_auctions(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let auctions = auctions::fetch_active_auctions(now, &mut conn).await?;
        Ok(auctions)
    }

    async fn fetch_auctions_for_owner(&self, owner: &UserId) -> Result<Vec<Auction>, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let auctions = auctions::fetch_auctions_for_owner(owner, &mut conn).await?;
        Ok(auctions)
    }

    async fn fetch_auctions_with_bids_from(&self, bidder: &UserId) -> Result<Vec<Auction>, AuctionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let auctions = auctions::fetch_auctions_with_bids_from(bidder, &mut conn).await?;
        Ok(auctions)
    }

    async fn close(&mut self) -> Result<(), AuctionStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl UserAuth for SqliteDatabase {
    async fn create_user(&self, username: &UserId, password_digest: &str, salt: &str) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(username, password_digest, salt, &mut conn).await
    }

    async fn fetch_credentials(&self, username: &UserId) -> Result<Option<UserCredentials>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_name(username, &mut conn).await?;
        Ok(user)
    }
}
