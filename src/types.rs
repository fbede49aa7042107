//! Core types for the subscription registry.

use alloy_primitives::keccak256;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

pub use alloy_primitives::{Address, Bytes, B256};

/// 4-byte function selector of a callback.
pub type Selector = [u8; 4];

/// Unique identifier for a subscription.
///
/// Always derived from `(target, event_signature, subscriber)`; never stored
/// on its own.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub B256);

impl SubscriptionId {
    /// Compute the identity of a subscription.
    ///
    /// `keccak256(target ‖ event_signature ‖ subscriber)`. The input order is
    /// consensus-visible.
    pub fn compute(target: &Address, event_signature: &B256, subscriber: &Address) -> Self {
        let mut preimage = [0u8; 72];
        preimage[..20].copy_from_slice(target.as_slice());
        preimage[20..52].copy_from_slice(event_signature.as_slice());
        preimage[52..].copy_from_slice(subscriber.as_slice());
        SubscriptionId(keccak256(preimage))
    }

    /// Convert to hex string (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(SubscriptionId(B256::from(arr)))
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Free-function form of [`SubscriptionId::compute`].
pub fn compute_subscription_id(
    target: &Address,
    event_signature: &B256,
    subscriber: &Address,
) -> SubscriptionId {
    SubscriptionId::compute(target, event_signature, subscriber)
}

/// Arbitrary-precision non-negative amount (wei).
///
/// Gas prices and deposit balances use this everywhere so that no
/// multiplication or addition can truncate.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// `gas * self`, exact.
    pub fn times_gas(&self, gas: u64) -> Amount {
        Amount(&self.0 * BigUint::from(gas))
    }

    /// Subtract, or `None` if the result would be negative.
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 >= other.0 {
            Some(Amount(&self.0 - &other.0))
        } else {
            None
        }
    }

    /// Minimal big-endian bytes. Zero encodes as an empty slice.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Amount(BigUint::from_bytes_be(bytes))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigUint::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Amount(value)
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl FromStr for Amount {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s).map(Amount)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Decimal strings, so large balances survive JSON consumers.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A raw log as appended to the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract (the well-known registry address).
    pub address: Address,

    /// Ordered topics; topic 0 names the event kind.
    pub topics: Vec<B256>,

    /// Opaque payload.
    pub data: Bytes,
}
