//! In-memory registry with an append-ordered event index.

use super::Registry;
use crate::codec::encode_subscription;
use crate::subscriptions::Subscription;
use crate::types::{Address, LogEntry, SubscriptionId, B256};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// SHA-256 commitment over every record in registration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateRoot(pub [u8; 32]);

impl StateRoot {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRoot({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Registry held entirely in memory.
///
/// Lookups by id go through a hash map; enumeration never does. Every id is
/// appended to its `(target, event_signature)` list the first time it is
/// written and keeps that position forever, since records are only ever
/// deactivated, never removed.
#[derive(Default)]
pub struct MemoryRegistry {
    /// Records by id.
    records: RwLock<HashMap<SubscriptionId, Subscription>>,

    /// (target, event_signature) -> ids in first-write order.
    by_event: RwLock<HashMap<(Address, B256), Vec<SubscriptionId>>>,

    /// All ids in first-write order.
    order: RwLock<Vec<SubscriptionId>>,

    /// Appended logs.
    logs: RwLock<Vec<LogEntry>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records (active or not).
    pub fn len(&self) -> usize {
        self.order.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.read().is_empty()
    }

    /// Snapshot of every appended log, oldest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.read().clone()
    }

    /// Commit to the full registry contents.
    ///
    /// Each record contributes its id followed by its length-prefixed
    /// canonical encoding, in registration order.
    pub fn state_root(&self) -> StateRoot {
        let records = self.records.read();
        let mut hasher = Sha256::new();
        for id in self.order.read().iter() {
            if let Some(sub) = records.get(id) {
                let encoded = encode_subscription(sub);
                hasher.update(id.0.as_slice());
                hasher.update((encoded.len() as u64).to_be_bytes());
                hasher.update(&encoded);
            }
        }
        StateRoot(hasher.finalize().into())
    }
}

impl Registry for MemoryRegistry {
    fn get(&self, id: &SubscriptionId) -> Option<Subscription> {
        self.records.read().get(id).cloned()
    }

    fn set(&self, id: SubscriptionId, subscription: &Subscription) {
        let previous = self.records.write().insert(id, subscription.clone());
        if previous.is_none() {
            self.order.write().push(id);
            self.by_event
                .write()
                .entry((subscription.target_contract, subscription.event_signature))
                .or_default()
                .push(id);
        }
    }

    fn list_by_target_and_signature(
        &self,
        target: &Address,
        event_signature: &B256,
    ) -> Vec<Subscription> {
        let by_event = self.by_event.read();
        let Some(ids) = by_event.get(&(*target, *event_signature)) else {
            return Vec::new();
        };
        let records = self.records.read();
        ids.iter().filter_map(|id| records.get(id).cloned()).collect()
    }

    fn append_log(&self, entry: LogEntry) {
        self.logs.write().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::SubscriptionParams;
    use crate::types::Bytes;

    fn make_subscription(subscriber: u8) -> Subscription {
        Subscription::new(SubscriptionParams::new(
            Address::repeat_byte(0xAA),
            B256::repeat_byte(0x11),
            Address::repeat_byte(subscriber),
            [0, 0, 0, 1],
        ))
    }

    #[test]
    fn test_get_set() {
        let registry = MemoryRegistry::new();
        let sub = make_subscription(1);

        assert!(registry.get(&sub.id).is_none());
        registry.set(sub.id, &sub);
        assert_eq!(registry.get(&sub.id), Some(sub));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_listing_keeps_first_write_order() {
        let registry = MemoryRegistry::new();
        let subs: Vec<_> = [9u8, 3, 7, 1].iter().map(|b| make_subscription(*b)).collect();
        for sub in &subs {
            registry.set(sub.id, sub);
        }

        // Rewriting an early record must not move it.
        let mut first = subs[0].clone();
        first.active = false;
        registry.set(first.id, &first);

        let listed = registry.list_by_target_and_signature(
            &Address::repeat_byte(0xAA),
            &B256::repeat_byte(0x11),
        );
        let ids: Vec<_> = listed.iter().map(|s| s.id).collect();
        let expected: Vec<_> = subs.iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);
        assert!(!listed[0].active);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_listing_unknown_pair_is_empty() {
        let registry = MemoryRegistry::new();
        let sub = make_subscription(1);
        registry.set(sub.id, &sub);

        assert!(registry
            .list_by_target_and_signature(&Address::repeat_byte(0xAA), &B256::ZERO)
            .is_empty());
    }

    #[test]
    fn test_logs_append_in_order() {
        let registry = MemoryRegistry::new();
        for i in 0..3u8 {
            registry.append_log(LogEntry {
                address: Address::ZERO,
                topics: vec![B256::repeat_byte(i)],
                data: Bytes::new(),
            });
        }
        let logs = registry.logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[2].topics[0], B256::repeat_byte(2));
    }

    #[test]
    fn test_state_root_tracks_contents() {
        let a = MemoryRegistry::new();
        let b = MemoryRegistry::new();
        assert_eq!(a.state_root(), b.state_root());

        let sub = make_subscription(1);
        a.set(sub.id, &sub);
        b.set(sub.id, &sub);
        assert_eq!(a.state_root(), b.state_root());

        let mut changed = sub.clone();
        changed.gas_limit = 1;
        b.set(changed.id, &changed);
        assert_ne!(a.state_root(), b.state_root());
        assert_eq!(a.state_root().to_hex().len(), 64);
    }
}
