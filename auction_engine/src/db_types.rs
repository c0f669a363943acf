use std::{fmt::Display, str::FromStr};

use ah_common::Money;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      UserId       -----------------------------------------------------------
/// A lightweight wrapper around the verified username of a registered participant.
///
/// The engine treats this as an opaque authenticated identity. It never derives or checks credentials itself; the
/// server's identity layer is responsible for only ever constructing a `UserId` from a verified token.
#[derive(Clone, Debug, Type, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub String);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for UserId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     AuctionId     -----------------------------------------------------------
/// The opaque, immutable public identifier of an auction, assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct AuctionId(pub String);

impl AuctionId {
    /// Generates a fresh random auction id.
    pub fn random() -> Self {
        let id: u128 = rand::thread_rng().gen();
        Self(format!("{id:032x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AuctionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for AuctionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for AuctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   AuctionStatus   -----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum AuctionStatus {
    /// The auction is open and accepting bids.
    Active,
    /// The auction has ended, either because the owner closed it, or because its deadline passed.
    Ended,
    /// The auction was cancelled by its owner before ending.
    Cancelled,
}

impl AuctionStatus {
    /// Terminal states never transition again.
    pub fn is_final(&self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Cancelled)
    }
}

impl Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuctionStatus::Active => write!(f, "Active"),
            AuctionStatus::Ended => write!(f, "Ended"),
            AuctionStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid auction status: {0}")]
pub struct ConversionError(String);

impl FromStr for AuctionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Ended" => Ok(Self::Ended),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid auction status: {s}"))),
        }
    }
}

//--------------------------------------      Auction      -----------------------------------------------------------
/// The auction aggregate as stored in the database.
///
/// `version` is the optimistic-concurrency token. Every successful mutation bumps it, and every conditional write
/// carries the version the writer observed, so stale writers always lose.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Auction {
    pub id: i64,
    pub auction_id: AuctionId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub starting_price: Money,
    pub owner: UserId,
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
    pub current_bid_amount: Money,
    pub current_bidder: Option<UserId>,
    pub current_bid_time: DateTime<Utc>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auction {
    /// The winning-bid summary for this auction. `bidder` is `None` until the first bid is accepted.
    pub fn current_bid(&self) -> CurrentBid {
        CurrentBid {
            amount: self.current_bid_amount,
            bidder: self.current_bidder.clone(),
            placed_at: self.current_bid_time,
        }
    }

    /// True when the deadline has passed. An expired auction may still read `Active` until the lazy-expiry
    /// transition is applied on access.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }
}

//--------------------------------------     CurrentBid    -----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentBid {
    pub amount: Money,
    pub bidder: Option<UserId>,
    pub placed_at: DateTime<Utc>,
}

//--------------------------------------     NewAuction    -----------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuction {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    /// The minimum acceptable amount. The first accepted bid must strictly exceed it.
    pub starting_price: Money,
    /// The identity of the creating user. An owner can never bid on their own auction.
    pub owner: UserId,
    /// The deadline. Immutable once set; there is no time extension.
    pub end_time: DateTime<Utc>,
}

impl NewAuction {
    pub fn new(title: &str, description: &str, starting_price: Money, owner: UserId, end_time: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            image_url: None,
            starting_price,
            owner,
            end_time,
        }
    }

    pub fn with_image_url(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }
}

//--------------------------------------       NewBid      -----------------------------------------------------------
/// A candidate bid, before validation. Bids are ephemeral; an accepted bid only survives as its `BidEntry` in the
/// history and (while winning) as the auction's current bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBid {
    pub bidder: UserId,
    pub amount: Money,
}

impl NewBid {
    pub fn new(bidder: UserId, amount: Money) -> Self {
        Self { bidder, amount }
    }
}

//--------------------------------------      BidEntry     -----------------------------------------------------------
/// One row of an auction's append-only bid history, ordered by submission order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BidEntry {
    pub id: i64,
    pub auction_id: i64,
    pub bidder: UserId,
    pub amount: Money,
    pub placed_at: DateTime<Utc>,
}

//--------------------------------------    FullAuction    -----------------------------------------------------------
/// An auction together with its complete bid history. Read-side view only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAuction {
    pub auction: Auction,
    pub bids: Vec<BidEntry>,
}

//--------------------------------------   UserCredentials  ----------------------------------------------------------
/// A stored credential record. The digest is a salted Blake2b hash; the cleartext password is never stored.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: UserId,
    pub password_digest: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}
