//! On-chain event subscriptions.
//!
//! A subscriber registers interest in an event `(target, event_signature)`
//! and prepays a deposit. When the event fires, the manager selects every
//! active, sufficiently funded subscription in registry order, charges
//! `gas_limit * gas_price` for each, and hands back bounded-gas callback
//! descriptors. The executor reports actual gas use afterwards so the
//! unused part can be refunded.
//!
//! # Example
//!
//! ```ignore
//! let registry = MemoryRegistry::new();
//! let manager = SubscriptionManager::new(&registry);
//!
//! let id = manager.subscribe(
//!     SubscriptionParams::new(target, transfer_sig, subscriber, selector)
//!         .with_gas(100_000, Amount::from(1000u64)),
//! );
//! manager.deposit(&id, &Amount::from(500_000_000u64))?;
//!
//! for callback in manager.notify_subscribers(&target, &transfer_sig, &data, &origin) {
//!     let gas_used = executor.run(&callback);
//!     manager.refund_gas(&callback.subscription_id, gas_used);
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    callback_data, CallbackExecution, ManagerConfig, ResubscribePolicy, Subscription,
    SubscriptionEventKind, SubscriptionLog, SubscriptionParams, SubscriptionState,
    SUBSCRIPTION_REGISTRY_ADDRESS,
};
