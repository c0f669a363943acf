use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    db_types::{BidEntry, NewBid},
    traits::AuctionStoreError,
};

/// Appends one entry to an auction's bid history. `auction_row_id` is the internal row id of the auction record.
/// The history is append-only; nothing in the codebase updates or deletes rows in `bids`.
pub async fn append_bid(
    auction_row_id: i64,
    bid: &NewBid,
    placed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<BidEntry, AuctionStoreError> {
    let entry = sqlx::query_as(
        "INSERT INTO bids (auction_id, bidder, amount, placed_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(auction_row_id)
    .bind(&bid.bidder)
    .bind(bid.amount.value())
    .bind(placed_at)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

/// The full bid history for an auction, in submission order.
pub async fn fetch_bids_for_auction(
    auction_row_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<BidEntry>, sqlx::Error> {
    let bids = sqlx::query_as("SELECT * FROM bids WHERE auction_id = $1 ORDER BY id ASC")
        .bind(auction_row_id)
        .fetch_all(conn)
        .await?;
    Ok(bids)
}
