//! Subscription records, accounting, and the values the manager produces.

use crate::types::{Address, Amount, Bytes, LogEntry, Selector, SubscriptionId, B256};
use alloy_primitives::address;
use serde::{Deserialize, Serialize};

/// Well-known address that emits subscription logs.
pub const SUBSCRIPTION_REGISTRY_ADDRESS: Address =
    address!("0000000000000000000000000000000000008082");

/// Parameters for a new subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionParams {
    /// Contract emitting the event.
    pub target: Address,
    /// Hash of the event signature.
    pub event_signature: B256,
    /// Contract that owns the subscription.
    pub subscriber: Address,
    /// Contract to call back (usually the subscriber).
    pub callback_address: Address,
    pub callback_selector: Selector,
    pub gas_limit: u64,
    pub gas_price: Amount,
}

impl SubscriptionParams {
    /// Parameters where the subscriber is also the callback target.
    pub fn new(
        target: Address,
        event_signature: B256,
        subscriber: Address,
        callback_selector: Selector,
    ) -> Self {
        Self {
            target,
            event_signature,
            subscriber,
            callback_address: subscriber,
            callback_selector,
            gas_limit: 0,
            gas_price: Amount::zero(),
        }
    }

    /// Set a distinct callback contract.
    pub fn with_callback_address(mut self, callback_address: Address) -> Self {
        self.callback_address = callback_address;
        self
    }

    /// Set gas limit and price.
    pub fn with_gas(mut self, gas_limit: u64, gas_price: Amount) -> Self {
        self.gas_limit = gas_limit;
        self.gas_price = gas_price;
        self
    }

    pub fn id(&self) -> SubscriptionId {
        SubscriptionId::compute(&self.target, &self.event_signature, &self.subscriber)
    }
}

/// A persisted event subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Derived from the next three fields, recomputed on every decode.
    pub id: SubscriptionId,

    pub target_contract: Address,
    pub event_signature: B256,
    pub subscriber_contract: Address,

    pub callback_address: Address,
    pub callback_selector: Selector,

    /// Maximum gas for one callback.
    pub gas_limit: u64,

    /// Price per unit of callback gas.
    pub gas_price: Amount,

    /// Prepaid funds for callbacks.
    pub deposit_balance: Amount,

    /// Soft-delete flag. Records are never erased.
    pub active: bool,
}

impl Subscription {
    /// Fresh, active, unfunded subscription.
    pub fn new(params: SubscriptionParams) -> Self {
        Self {
            id: params.id(),
            target_contract: params.target,
            event_signature: params.event_signature,
            subscriber_contract: params.subscriber,
            callback_address: params.callback_address,
            callback_selector: params.callback_selector,
            gas_limit: params.gas_limit,
            gas_price: params.gas_price,
            deposit_balance: Amount::zero(),
            active: true,
        }
    }

    /// Cost of one callback: `gas_limit * gas_price`.
    pub fn gas_cost(&self) -> Amount {
        self.gas_price.times_gas(self.gas_limit)
    }

    pub fn has_sufficient_deposit(&self) -> bool {
        self.deposit_balance >= self.gas_cost()
    }

    /// Charge one callback. Leaves the balance untouched and returns false
    /// when it does not cover the cost.
    pub fn deduct_gas(&mut self) -> bool {
        match self.deposit_balance.checked_sub(&self.gas_cost()) {
            Some(remaining) => {
                self.deposit_balance = remaining;
                true
            }
            None => false,
        }
    }

    /// Credit that `refund_gas(gas_used)` would apply.
    ///
    /// `gas_used` above the limit saturates to a zero refund.
    pub fn refund_amount(&self, gas_used: u64) -> Amount {
        self.gas_price.times_gas(self.gas_limit.saturating_sub(gas_used))
    }

    /// Return the price of unused gas to the deposit.
    pub fn refund_gas(&mut self, gas_used: u64) {
        let refund = self.refund_amount(gas_used);
        self.deposit_balance += &refund;
    }
}

/// Lifecycle state of one identity.
///
/// | state        | subscribe                        | unsubscribe |
/// |--------------|----------------------------------|-------------|
/// | Unregistered | Active (new record)              | no-op       |
/// | Active       | no-op                            | Cancelled   |
/// | Cancelled    | Active, per [`ResubscribePolicy`] | no-op       |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Unregistered,
    Active,
    Cancelled,
}

impl SubscriptionState {
    pub fn of(record: Option<&Subscription>) -> Self {
        match record {
            None => SubscriptionState::Unregistered,
            Some(sub) if sub.active => SubscriptionState::Active,
            Some(_) => SubscriptionState::Cancelled,
        }
    }
}

/// What re-subscribing a cancelled identity does with its residual deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResubscribePolicy {
    /// Carry the residual balance into the new registration.
    #[default]
    PreserveDeposit,
    /// Start from zero; the residual balance is discarded.
    ResetDeposit,
}

/// Configuration for a subscription manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Address stamped on every emitted log.
    /// Default: `0x…8082`
    pub registry_address: Address,

    /// Re-subscription rule for cancelled identities.
    /// Default: `PreserveDeposit`
    pub resubscribe_policy: ResubscribePolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            registry_address: SUBSCRIPTION_REGISTRY_ADDRESS,
            resubscribe_policy: ResubscribePolicy::default(),
        }
    }
}

impl ManagerConfig {
    pub fn with_registry_address(mut self, address: Address) -> Self {
        self.registry_address = address;
        self
    }

    pub fn with_resubscribe_policy(mut self, policy: ResubscribePolicy) -> Self {
        self.resubscribe_policy = policy;
        self
    }
}

/// A pending callback authorized and paid for by notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackExecution {
    pub subscription_id: SubscriptionId,
    pub subscriber_address: Address,
    pub callback_address: Address,
    /// `selector ‖ event_data`, no further encoding.
    pub callback_data: Bytes,
    pub gas_limit: u64,
    pub gas_price: Amount,
    /// `tx.origin` of the transaction that emitted the event.
    pub original_origin: Address,
}

impl CallbackExecution {
    pub fn gas_cost(&self) -> Amount {
        self.gas_price.times_gas(self.gas_limit)
    }
}

/// Concatenate a selector and raw event data.
pub fn callback_data(selector: &Selector, event_data: &[u8]) -> Bytes {
    let mut data = Vec::with_capacity(selector.len() + event_data.len());
    data.extend_from_slice(selector);
    data.extend_from_slice(event_data);
    Bytes::from(data)
}

/// Kinds of subscription events observed downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionEventKind {
    Created,
    Deleted,
    CallbackSuccess,
    CallbackFailed,
    InsufficientDeposit,
}

impl SubscriptionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionEventKind::Created => "created",
            SubscriptionEventKind::Deleted => "deleted",
            SubscriptionEventKind::CallbackSuccess => "callback_success",
            SubscriptionEventKind::CallbackFailed => "callback_failed",
            SubscriptionEventKind::InsufficientDeposit => "insufficient_deposit",
        }
    }

    /// Topic 0 of the logs the manager emits for this kind.
    ///
    /// The ASCII event name left-padded to 32 bytes. Callback outcomes are
    /// reported by the executor, not logged here.
    pub fn topic(&self) -> Option<B256> {
        let name: &[u8] = match self {
            SubscriptionEventKind::Created => b"SubscriptionCreated",
            SubscriptionEventKind::Deleted => b"SubscriptionRemoved",
            SubscriptionEventKind::InsufficientDeposit => b"InsufficientDeposit",
            SubscriptionEventKind::CallbackSuccess | SubscriptionEventKind::CallbackFailed => {
                return None
            }
        };
        Some(B256::left_padding_from(name))
    }

    fn from_topic(topic: &B256) -> Option<Self> {
        [
            SubscriptionEventKind::Created,
            SubscriptionEventKind::Deleted,
            SubscriptionEventKind::InsufficientDeposit,
        ]
        .into_iter()
        .find(|kind| kind.topic().as_ref() == Some(topic))
    }
}

/// Structured view of a subscription log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionLog {
    pub subscription_id: SubscriptionId,
    pub event_type: SubscriptionEventKind,
    pub block_number: u64,
    pub data: Bytes,
}

impl SubscriptionLog {
    /// Read a raw log emitted by `registry_address` back into its
    /// structured form. Returns `None` for foreign or unrecognized logs.
    pub fn from_log_entry(
        entry: &LogEntry,
        registry_address: &Address,
        block_number: u64,
    ) -> Option<Self> {
        if entry.address != *registry_address {
            return None;
        }
        let kind = SubscriptionEventKind::from_topic(entry.topics.first()?)?;
        let expected_topics = match kind {
            SubscriptionEventKind::Created => 4,
            _ => 2,
        };
        if entry.topics.len() != expected_topics {
            return None;
        }

        Some(Self {
            subscription_id: SubscriptionId(entry.topics[1]),
            event_type: kind,
            block_number,
            data: entry.data.clone(),
        })
    }
}
