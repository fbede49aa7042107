//! # Event Subscriptions
//!
//! A deterministic on-chain event subscription registry with gas deposit
//! accounting.
//!
//! ## Core Concepts
//!
//! - **Subscriptions**: Records binding a subscriber to `(target, event)`,
//!   identified by `keccak256(target ‖ event_signature ‖ subscriber)`
//! - **Deposits**: Arbitrary-precision prepaid balances charged per callback
//! - **Registry**: The injected store that owns all state and keeps an
//!   order-stable index, so every node visits subscribers identically
//! - **Callbacks**: Transient descriptors produced by notification
//!
//! ## Example
//!
//! ```ignore
//! use event_subscriptions::{Amount, MemoryRegistry, SubscriptionManager, SubscriptionParams};
//!
//! let registry = MemoryRegistry::new();
//! let manager = SubscriptionManager::new(&registry);
//!
//! let id = manager.subscribe(
//!     SubscriptionParams::new(target, event_sig, subscriber, [0x01, 0x02, 0x03, 0x04])
//!         .with_gas(100_000, Amount::from(1000u64)),
//! );
//! manager.deposit(&id, &Amount::from(500_000_000u64))?;
//!
//! let callbacks = manager.notify_subscribers(&target, &event_sig, &[0xFF], &origin);
//! ```

pub mod codec;
pub mod error;
pub mod registry;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use codec::{decode_subscription, encode_subscription};
pub use error::{Result, SubscriptionError};
pub use registry::{MemoryRegistry, Registry, StateRoot};
pub use subscriptions::{
    callback_data, CallbackExecution, ManagerConfig, ResubscribePolicy, Subscription,
    SubscriptionEventKind, SubscriptionLog, SubscriptionManager, SubscriptionParams,
    SubscriptionState, SUBSCRIPTION_REGISTRY_ADDRESS,
};
pub use types::*;
