//! Auction Engine
//!
//! The auction engine contains the core logic for running timed auctions: accepting (or rejecting) bids,
//! moving auctions through their lifecycle, and answering read-side queries. It is provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`], [`mod@traits`]). SQLite is the supported backend. You should
//!    never need to access the database directly. Instead, use the public API provided by the engine. The exception
//!    is the data types used in the database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@engine_api`]). This provides the public-facing functionality of the engine: placing
//!    bids, creating and finalising auctions, queries, and user authentication. Specific backends need to implement
//!    the traits in [`mod@traits`] in order to act as a backend for the auction server.
//!
//! The central concurrency rule is that every mutation of an auction record goes through a *conditional write*: the
//! backend only commits the write if the record is still in the state the caller observed when it read it. Concurrent
//! bidders therefore never silently overwrite one another; the loser of a race re-reads and re-validates.
pub mod db_types;
pub mod engine_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use engine_api::{
    auction_query_api::AuctionQueryApi,
    auth_api::AuthApi,
    bid_flow_api::{BidFlowApi, MAX_BID_ATTEMPTS},
    bid_validator::{validate_bid, BidRejection},
    errors::BidFlowError,
};
pub use traits::{AuctionStore, AuctionStoreError, AuthApiError, UserAuth};
