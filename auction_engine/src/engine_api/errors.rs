use thiserror::Error;

use crate::{
    db_types::AuctionId,
    engine_api::bid_validator::BidRejection,
    traits::AuctionStoreError,
};

/// Errors surfaced by the bid flow and query APIs.
///
/// The taxonomy matters to callers:
/// * [`BidFlowError::Rejected`] variants are permanent for the given input — never retried.
/// * [`BidFlowError::NotFound`], [`BidFlowError::NotAuthorized`] and [`BidFlowError::AlreadyFinal`] are permanent
///   given the current auction state.
/// * [`BidFlowError::Contention`] is transient: the engine exhausted its internal retry budget and the caller may
///   retry the whole submission.
#[derive(Debug, Clone, Error)]
pub enum BidFlowError {
    #[error("The requested auction {0} does not exist")]
    NotFound(AuctionId),
    #[error("{0}")]
    Rejected(#[from] BidRejection),
    #[error("Only the auction owner may do that")]
    NotAuthorized,
    #[error("The auction has already been finalised")]
    AlreadyFinal,
    #[error("Invalid auction: {0}")]
    InvalidAuction(String),
    #[error("The bid could not be committed after repeated write conflicts; please retry")]
    Contention,
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<AuctionStoreError> for BidFlowError {
    fn from(e: AuctionStoreError) -> Self {
        match e {
            AuctionStoreError::AuctionNotFound(id) => BidFlowError::NotFound(id),
            // A raw conflict leaking out of the store means a single conditional write lost its race; the flow APIs
            // normally absorb these into a re-read, so treat a stray one as transient.
            AuctionStoreError::WriteConflict => BidFlowError::Contention,
            other => BidFlowError::Backend(other.to_string()),
        }
    }
}
