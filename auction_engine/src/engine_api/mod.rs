//! # Auction engine public API
//!
//! The `engine_api` module exposes the programmatic API for the auction engine. The API is modular, so that clients
//! can pick and choose the functionality they want, or run different parts on different machines.
//!
//! * [`bid_flow_api`] is the primary API: it owns the read-validate-write cycle for bid submissions and the auction
//!   lifecycle transitions (create, close, cancel, lazy expiry).
//! * [`bid_validator`] holds the pure validation rules a candidate bid is checked against. It never mutates state.
//! * [`auction_query_api`] provides the read-side views: single auction with history, active listings, and
//!   per-identity listings.
//! * [`auth_api`] manages participant registration and credential verification.
//!
//! # API usage
//!
//! The pattern for all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the traits required by the API:
//!
//! ```rust,ignore
//! use auction_engine::{BidFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements AuctionStore
//! let api = BidFlowApi::new(db);
//! let auction = api.place_bid(&auction_id, bidder, amount, Utc::now()).await?;
//! ```
//!
//! Note that `now` is always an explicit argument. The engine never reads the ambient wall clock, so tests can
//! simulate deadline expiry deterministically.

pub mod auction_query_api;
pub mod auth_api;
pub mod bid_flow_api;
pub mod bid_validator;
pub mod errors;
