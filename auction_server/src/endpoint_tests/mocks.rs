use ah_common::Money;
use auction_engine::{
    db_types::{Auction, AuctionId, AuctionStatus, BidEntry, NewAuction, NewBid, UserCredentials, UserId},
    AuctionStore,
    AuctionStoreError,
    AuthApiError,
    UserAuth,
};
use chrono::{DateTime, Duration, Utc};
use mockall::mock;

mock! {
    pub AuctionDb {}
    impl AuctionStore for AuctionDb {
        fn url(&self) -> &str;
        async fn insert_auction(&self, auction: NewAuction, now: DateTime<Utc>) -> Result<Auction, AuctionStoreError>;
        async fn fetch_auction(&self, auction_id: &AuctionId) -> Result<Option<Auction>, AuctionStoreError>;
        async fn fetch_bid_history(&self, auction_id: &AuctionId) -> Result<Vec<BidEntry>, AuctionStoreError>;
        async fn commit_bid(&self, auction_id: &AuctionId, bid: &NewBid, now: DateTime<Utc>, expected_version: i64) -> Result<Auction, AuctionStoreError>;
        async fn finalize_auction(&self, auction_id: &AuctionId, new_status: AuctionStatus, now: DateTime<Utc>) -> Result<Auction, AuctionStoreError>;
        async fn fetch_active_auctions(&self, now: DateTime<Utc>) -> Result<Vec<Auction>, AuctionStoreError>;
        async fn fetch_auctions_for_owner(&self, owner: &UserId) -> Result<Vec<Auction>, AuctionStoreError>;
        async fn fetch_auctions_with_bids_from(&self, bidder: &UserId) -> Result<Vec<Auction>, AuctionStoreError>;
    }
}

mock! {
    pub UserDb {}
    impl UserAuth for UserDb {
        async fn create_user(&self, username: &UserId, password_digest: &str, salt: &str) -> Result<(), AuthApiError>;
        async fn fetch_credentials(&self, username: &UserId) -> Result<Option<UserCredentials>, AuthApiError>;
    }
}

/// The record a store would mint for a brand-new auction.
pub fn auction_from(new: NewAuction, now: DateTime<Utc>) -> Auction {
    Auction {
        id: 1,
        auction_id: AuctionId("cafebabe".to_string()),
        title: new.title,
        description: new.description,
        image_url: new.image_url,
        starting_price: new.starting_price,
        owner: new.owner,
        end_time: new.end_time,
        status: AuctionStatus::Active,
        current_bid_amount: new.starting_price,
        current_bidder: None,
        current_bid_time: now,
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

/// A live auction owned by `owner`, one hour from expiry, with no bids yet.
pub fn sample_auction(owner: &str, now: DateTime<Utc>) -> Auction {
    Auction {
        id: 1,
        auction_id: AuctionId("cafebabe".to_string()),
        title: "Vintage synthesizer".to_string(),
        description: "A well-loved analog synth".to_string(),
        image_url: None,
        starting_price: Money::from(100),
        owner: UserId::from(owner),
        end_time: now + Duration::hours(1),
        status: AuctionStatus::Active,
        current_bid_amount: Money::from(100),
        current_bidder: None,
        current_bid_time: now,
        version: 0,
        created_at: now,
        updated_at: now,
    }
}
