//! Storage contract consumed by the subscription manager.
//!
//! The registry is the sole owner of subscription state. The manager reads,
//! mutates a private copy, and writes back through these primitives, so any
//! journaling or rollback lives entirely at this layer.

mod memory;

pub use memory::{MemoryRegistry, StateRoot};

use crate::subscriptions::Subscription;
use crate::types::{Address, LogEntry, SubscriptionId, B256};

/// Key-addressed subscription storage with an order-stable event index.
pub trait Registry {
    /// Load the record for `id`, if one was ever written.
    fn get(&self, id: &SubscriptionId) -> Option<Subscription>;

    /// Overwrite the record for `id`.
    fn set(&self, id: SubscriptionId, subscription: &Subscription);

    /// All records registered for `(target, event_signature)`.
    ///
    /// The order must be identical across calls on unchanged state.
    fn list_by_target_and_signature(
        &self,
        target: &Address,
        event_signature: &B256,
    ) -> Vec<Subscription>;

    /// Append a log entry.
    fn append_log(&self, entry: LogEntry);
}
