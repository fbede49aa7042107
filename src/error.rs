//! Error types for subscription operations.

use crate::types::{Amount, SubscriptionId};
use thiserror::Error;

/// Main error type for subscription operations.
///
/// Only two conditions are failures at the protocol level. Everything else
/// (unknown id on unsubscribe or refund, underfunded subscriptions during
/// notification, re-subscribing while active) is a silent no-op.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(SubscriptionId),

    #[error("Insufficient deposit for {id}: balance {balance}, requested {requested}")]
    InsufficientDeposit {
        id: SubscriptionId,
        balance: Amount,
        requested: Amount,
    },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<alloy_rlp::Error> for SubscriptionError {
    fn from(e: alloy_rlp::Error) -> Self {
        SubscriptionError::Decode(e.to_string())
    }
}

/// Result type for subscription operations.
pub type Result<T> = std::result::Result<T, SubscriptionError>;
