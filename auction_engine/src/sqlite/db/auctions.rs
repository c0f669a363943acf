use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Auction, AuctionId, AuctionStatus, NewAuction, NewBid, UserId},
    traits::AuctionStoreError,
};

/// Inserts a new auction record with `Active` status and the current bid initialised to the starting price with no
/// bidder. This is not atomic on its own; embed it in a transaction if needed and pass `&mut *tx` as the connection.
pub async fn insert_auction(
    auction: NewAuction,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Auction, AuctionStoreError> {
    let auction_id = AuctionId::random();
    let row = sqlx::query_as(
        r#"
            INSERT INTO auctions (
                auction_id,
                title,
                description,
                image_url,
                starting_price,
                owner,
                end_time,
                current_bid_amount,
                current_bid_time,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $5, $8, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(&auction_id)
    .bind(auction.title)
    .bind(auction.description)
    .bind(auction.image_url)
    .bind(auction.starting_price.value())
    .bind(auction.owner)
    .bind(auction.end_time)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AuctionStoreError::DuplicateAuction(auction_id.clone())
        },
        e => e.into(),
    })?;
    Ok(row)
}

/// Returns the auction record for the given public id, if it exists.
pub async fn fetch_auction_by_id(
    auction_id: &AuctionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Auction>, sqlx::Error> {
    let auction = sqlx::query_as("SELECT * FROM auctions WHERE auction_id = $1")
        .bind(auction_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(auction)
}

/// The conditional current-bid update. Commits only if the record is still `Active` at `expected_version`; returns
/// `None` when the condition fails (a concurrent writer got there first), in which case nothing was changed.
pub async fn conditional_bid_update(
    auction_id: &AuctionId,
    bid: &NewBid,
    now: DateTime<Utc>,
    expected_version: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Auction>, AuctionStoreError> {
    let row: Option<Auction> = sqlx::query_as(
        r#"
            UPDATE auctions SET
                current_bid_amount = $1,
                current_bidder = $2,
                current_bid_time = $3,
                version = version + 1,
                updated_at = $3
            WHERE auction_id = $4 AND status = 'Active' AND version = $5
            RETURNING *;
        "#,
    )
    .bind(bid.amount.value())
    .bind(&bid.bidder)
    .bind(now)
    .bind(auction_id.as_str())
    .bind(expected_version)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Conditional bid update on [{auction_id}] at version {expected_version}: hit={}", row.is_some());
    Ok(row)
}

/// The conditional lifecycle transition. Moves the auction to the given terminal status only if it is still
/// `Active`; returns `None` when another transition won the race. Used by owner close/cancel and by lazy expiry,
/// which makes concurrent observers converge on exactly one terminal write.
pub async fn conditional_finalize(
    auction_id: &AuctionId,
    new_status: AuctionStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Auction>, AuctionStoreError> {
    if !new_status.is_final() {
        return Err(AuctionStoreError::InvalidFinalStatus(new_status));
    }
    let row: Option<Auction> = sqlx::query_as(
        r#"
            UPDATE auctions SET
                status = $1,
                version = version + 1,
                updated_at = $2
            WHERE auction_id = $3 AND status = 'Active'
            RETURNING *;
        "#,
    )
    .bind(new_status.to_string())
    .bind(now)
    .bind(auction_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Conditional finalize of [{auction_id}] to {new_status}: hit={}", row.is_some());
    Ok(row)
}

/// Auctions that are open for bidding at `now`, newest first. Records past their deadline are excluded even when
/// still marked `Active`; their terminal transition happens lazily on individual access.
pub async fn fetch_active_auctions(
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Auction>, sqlx::Error> {
    let auctions =
        sqlx::query_as("SELECT * FROM auctions WHERE status = 'Active' AND end_time > $1 ORDER BY created_at DESC")
            .bind(now)
            .fetch_all(conn)
            .await?;
    Ok(auctions)
}

/// All auctions created by the given owner, newest first.
pub async fn fetch_auctions_for_owner(
    owner: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Auction>, sqlx::Error> {
    let auctions = sqlx::query_as("SELECT * FROM auctions WHERE owner = $1 ORDER BY created_at DESC")
        .bind(owner)
        .fetch_all(conn)
        .await?;
    Ok(auctions)
}

/// All auctions the given identity has bid on, newest first.
pub async fn fetch_auctions_with_bids_from(
    bidder: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Auction>, sqlx::Error> {
    let auctions = sqlx::query_as(
        r#"
            SELECT DISTINCT auctions.* FROM auctions
            JOIN bids ON bids.auction_id = auctions.id
            WHERE bids.bidder = $1
            ORDER BY auctions.created_at DESC
        "#,
    )
    .bind(bidder)
    .fetch_all(conn)
    .await?;
    Ok(auctions)
}
