//! # Backend contracts
//!
//! This module defines the interface contracts that database backends must implement to support the auction engine.
//!
//! * [`AuctionStore`] is the persistent store for auction records: point reads, conditional writes, and the
//!   predicate queries that feed the read-side listings. The conditional-write methods are the heart of the engine's
//!   concurrency model; see the trait documentation for the exact semantics backends must provide.
//! * [`UserAuth`] is the credential store used by the registration/login supplement. The engine only ever sees
//!   opaque verified identities; this trait exists so the server can verify credentials against the same database.
mod auction_store;
mod user_auth;

pub use auction_store::{AuctionStore, AuctionStoreError};
pub use user_auth::{AuthApiError, UserAuth};
