//! Subscription manager: lifecycle, deposits, and notification fan-out.

use crate::error::{Result, SubscriptionError};
use crate::registry::Registry;
use crate::types::{Address, Amount, Bytes, LogEntry, SubscriptionId, B256};
use tracing::{debug, trace, warn};

use super::types::{
    callback_data, CallbackExecution, ManagerConfig, ResubscribePolicy, Subscription,
    SubscriptionEventKind, SubscriptionParams, SubscriptionState,
};

/// Operates on subscriptions held by a [`Registry`].
///
/// The manager keeps no state of its own: every operation reads from the
/// registry, mutates a local copy, and writes it straight back. It can be
/// constructed per call.
pub struct SubscriptionManager<'r, R: Registry + ?Sized> {
    registry: &'r R,
    config: ManagerConfig,
}

impl<'r, R: Registry + ?Sized> SubscriptionManager<'r, R> {
    /// Create a manager with the default configuration.
    pub fn new(registry: &'r R) -> Self {
        Self::with_config(registry, ManagerConfig::default())
    }

    pub fn with_config(registry: &'r R, config: ManagerConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Register a subscription and return its identity.
    ///
    /// Re-subscribing while active is a no-op. Re-subscribing a cancelled
    /// identity installs the new parameters and handles the residual deposit
    /// according to the configured [`ResubscribePolicy`].
    pub fn subscribe(&self, params: SubscriptionParams) -> SubscriptionId {
        let id = params.id();
        let existing = self.registry.get(&id);

        let mut subscription = Subscription::new(params);
        match (SubscriptionState::of(existing.as_ref()), existing) {
            (SubscriptionState::Active, _) => {
                trace!(%id, "already subscribed");
                return id;
            }
            (SubscriptionState::Cancelled, Some(previous)) => {
                match self.config.resubscribe_policy {
                    ResubscribePolicy::PreserveDeposit => {
                        subscription.deposit_balance = previous.deposit_balance;
                    }
                    ResubscribePolicy::ResetDeposit => {
                        if !previous.deposit_balance.is_zero() {
                            warn!(
                                %id,
                                discarded = %previous.deposit_balance,
                                "resubscribe discards residual deposit"
                            );
                        }
                    }
                }
                debug!(%id, balance = %subscription.deposit_balance, "subscription reactivated");
            }
            _ => debug!(%id, "subscription created"),
        }

        self.registry.set(id, &subscription);
        self.emit(
            SubscriptionEventKind::Created,
            vec![
                id.0,
                subscription.target_contract.into_word(),
                subscription.subscriber_contract.into_word(),
            ],
            Bytes::copy_from_slice(subscription.event_signature.as_slice()),
        );

        id
    }

    /// Deactivate a subscription.
    ///
    /// Returns whether anything changed. The deposit stays on the record;
    /// callers wanting it back must [`withdraw`](Self::withdraw) explicitly.
    pub fn unsubscribe(
        &self,
        target: &Address,
        event_signature: &B256,
        subscriber: &Address,
    ) -> bool {
        let id = SubscriptionId::compute(target, event_signature, subscriber);
        let Some(mut subscription) = self.registry.get(&id).filter(|s| s.active) else {
            trace!(%id, "unsubscribe of unknown or inactive subscription");
            return false;
        };

        subscription.active = false;
        self.registry.set(id, &subscription);
        self.emit(SubscriptionEventKind::Deleted, vec![id.0], Bytes::new());
        debug!(%id, "subscription cancelled");

        true
    }

    /// Lifecycle state of `id`.
    pub fn state(&self, id: &SubscriptionId) -> SubscriptionState {
        SubscriptionState::of(self.registry.get(id).as_ref())
    }

    // --- Notification ---

    /// Charge every eligible subscriber of `(target, event_signature)` for one
    /// callback and return the callbacks to run, in registry order.
    ///
    /// Inactive subscriptions are skipped silently; underfunded ones are
    /// skipped with an insufficient-deposit log. Nothing is invoked here.
    pub fn notify_subscribers(
        &self,
        target: &Address,
        event_signature: &B256,
        event_data: &[u8],
        origin: &Address,
    ) -> Vec<CallbackExecution> {
        let candidates = self
            .registry
            .list_by_target_and_signature(target, event_signature);
        let mut callbacks = Vec::with_capacity(candidates.len());

        for mut subscription in candidates {
            let id = subscription.id;
            if !subscription.active {
                trace!(%id, "skipping inactive subscription");
                continue;
            }

            if !subscription.deduct_gas() {
                warn!(
                    %id,
                    balance = %subscription.deposit_balance,
                    cost = %subscription.gas_cost(),
                    "insufficient deposit for callback"
                );
                self.emit(
                    SubscriptionEventKind::InsufficientDeposit,
                    vec![id.0],
                    Bytes::new(),
                );
                continue;
            }

            self.registry.set(id, &subscription);
            trace!(%id, remaining = %subscription.deposit_balance, "callback charged");

            callbacks.push(CallbackExecution {
                subscription_id: id,
                subscriber_address: subscription.subscriber_contract,
                callback_address: subscription.callback_address,
                callback_data: callback_data(&subscription.callback_selector, event_data),
                gas_limit: subscription.gas_limit,
                gas_price: subscription.gas_price,
                original_origin: *origin,
            });
        }

        debug!(
            contract = %target,
            event = %event_signature,
            callbacks = callbacks.len(),
            "subscribers notified"
        );
        callbacks
    }

    // --- Deposits ---

    /// Add `amount` to the deposit. Inactive subscriptions accept deposits.
    pub fn deposit(&self, id: &SubscriptionId, amount: &Amount) -> Result<()> {
        let mut subscription = self.load(id)?;
        subscription.deposit_balance += amount;
        self.registry.set(*id, &subscription);
        debug!(%id, %amount, balance = %subscription.deposit_balance, "deposit");
        Ok(())
    }

    /// Remove `amount` from the deposit. Fails without effect if the balance
    /// does not cover it.
    pub fn withdraw(&self, id: &SubscriptionId, amount: &Amount) -> Result<()> {
        let mut subscription = self.load(id)?;
        let remaining = subscription.deposit_balance.checked_sub(amount).ok_or_else(|| {
            SubscriptionError::InsufficientDeposit {
                id: *id,
                balance: subscription.deposit_balance.clone(),
                requested: amount.clone(),
            }
        })?;

        subscription.deposit_balance = remaining;
        self.registry.set(*id, &subscription);
        debug!(%id, %amount, balance = %subscription.deposit_balance, "withdrawal");
        Ok(())
    }

    /// Deposit balance of `id`, or zero if unknown.
    pub fn get_balance(&self, id: &SubscriptionId) -> Amount {
        self.registry
            .get(id)
            .map(|s| s.deposit_balance)
            .unwrap_or_default()
    }

    pub fn get_subscription(&self, id: &SubscriptionId) -> Option<Subscription> {
        self.registry.get(id)
    }

    /// Credit the price of unused gas after a callback ran.
    ///
    /// Unknown ids are ignored. A `gas_used` above the limit credits nothing.
    pub fn refund_gas(&self, id: &SubscriptionId, gas_used: u64) {
        let Some(mut subscription) = self.registry.get(id) else {
            trace!(%id, "refund for unknown subscription");
            return;
        };
        if gas_used > subscription.gas_limit {
            warn!(
                %id,
                gas_used,
                gas_limit = subscription.gas_limit,
                "reported gas exceeds limit, no refund"
            );
        }

        subscription.refund_gas(gas_used);
        self.registry.set(*id, &subscription);
        debug!(%id, gas_used, balance = %subscription.deposit_balance, "gas refunded");
    }

    /// Replace gas limit and price of an active subscription. Funds already
    /// charged are not reconciled.
    pub fn update_subscription(
        &self,
        id: &SubscriptionId,
        gas_limit: u64,
        gas_price: Amount,
    ) -> Result<()> {
        let mut subscription = self
            .registry
            .get(id)
            .filter(|s| s.active)
            .ok_or(SubscriptionError::InvalidSubscription(*id))?;

        subscription.gas_limit = gas_limit;
        subscription.gas_price = gas_price;
        self.registry.set(*id, &subscription);
        debug!(%id, gas_limit, gas_price = %subscription.gas_price, "subscription updated");
        Ok(())
    }

    // --- Helpers ---

    fn load(&self, id: &SubscriptionId) -> Result<Subscription> {
        self.registry
            .get(id)
            .ok_or(SubscriptionError::InvalidSubscription(*id))
    }

    /// Append a log from the registry address. `topics` follow the kind topic.
    fn emit(&self, kind: SubscriptionEventKind, topics: Vec<B256>, data: Bytes) {
        let Some(kind_topic) = kind.topic() else {
            return;
        };
        let mut all = Vec::with_capacity(topics.len() + 1);
        all.push(kind_topic);
        all.extend(topics);

        self.registry.append_log(LogEntry {
            address: self.config.registry_address,
            topics: all,
            data,
        });
    }
}
