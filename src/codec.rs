//! Canonical persisted encoding of subscriptions.
//!
//! A subscription is stored as an RLP list of nine fields:
//!
//! ```text
//! [target, event_signature, subscriber, callback_address, callback_selector,
//!  gas_limit, gas_price, deposit_balance, active]
//! ```
//!
//! The identity is not part of the encoding; decoding recomputes it from the
//! first three fields. Amounts are minimal big-endian byte strings (zero is the
//! empty string). This layout is consensus-visible: changing it is a protocol
//! upgrade.

use crate::error::{Result, SubscriptionError};
use crate::subscriptions::Subscription;
use crate::types::{Address, Amount, Selector, SubscriptionId, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header};

impl Encodable for Amount {
    fn encode(&self, out: &mut dyn BufMut) {
        self.to_be_bytes().as_slice().encode(out)
    }

    fn length(&self) -> usize {
        self.to_be_bytes().as_slice().length()
    }
}

impl Decodable for Amount {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if header.list {
            return Err(alloy_rlp::Error::UnexpectedList);
        }
        let data: &[u8] = *buf;
        if data.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let (bytes, rest) = data.split_at(header.payload_length);
        if bytes.first() == Some(&0) {
            return Err(alloy_rlp::Error::LeadingZero);
        }
        *buf = rest;
        Ok(Amount::from_be_bytes(bytes))
    }
}

impl Subscription {
    fn rlp_payload_length(&self) -> usize {
        self.target_contract.length()
            + self.event_signature.length()
            + self.subscriber_contract.length()
            + self.callback_address.length()
            + self.callback_selector.length()
            + self.gas_limit.length()
            + self.gas_price.length()
            + self.deposit_balance.length()
            + self.active.length()
    }
}

impl Encodable for Subscription {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.rlp_payload_length(),
        }
        .encode(out);
        self.target_contract.encode(out);
        self.event_signature.encode(out);
        self.subscriber_contract.encode(out);
        self.callback_address.encode(out);
        self.callback_selector.encode(out);
        self.gas_limit.encode(out);
        self.gas_price.encode(out);
        self.deposit_balance.encode(out);
        self.active.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.rlp_payload_length();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for Subscription {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let data: &[u8] = *buf;
        if data.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let (mut payload, rest) = data.split_at(header.payload_length);

        let target_contract = Address::decode(&mut payload)?;
        let event_signature = B256::decode(&mut payload)?;
        let subscriber_contract = Address::decode(&mut payload)?;
        let callback_address = Address::decode(&mut payload)?;
        let callback_selector = Selector::decode(&mut payload)?;
        let gas_limit = u64::decode(&mut payload)?;
        let gas_price = Amount::decode(&mut payload)?;
        let deposit_balance = Amount::decode(&mut payload)?;
        let active = bool::decode(&mut payload)?;

        if !payload.is_empty() {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: header.payload_length - payload.len(),
            });
        }
        *buf = rest;

        Ok(Subscription {
            id: SubscriptionId::compute(&target_contract, &event_signature, &subscriber_contract),
            target_contract,
            event_signature,
            subscriber_contract,
            callback_address,
            callback_selector,
            gas_limit,
            gas_price,
            deposit_balance,
            active,
        })
    }
}

/// Encode a subscription in its canonical form.
pub fn encode_subscription(subscription: &Subscription) -> Vec<u8> {
    let mut out = Vec::with_capacity(subscription.length());
    subscription.encode(&mut out);
    out
}

/// Decode a canonical subscription, recomputing its identity.
///
/// The input must hold exactly one encoded record.
pub fn decode_subscription(bytes: &[u8]) -> Result<Subscription> {
    let mut buf = bytes;
    let subscription = Subscription::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(SubscriptionError::Decode(format!(
            "{} trailing bytes after subscription",
            buf.len()
        )));
    }
    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::SubscriptionParams;

    fn make_subscription() -> Subscription {
        Subscription::new(
            SubscriptionParams::new(
                Address::repeat_byte(0xAA),
                B256::repeat_byte(0x11),
                Address::repeat_byte(0xBB),
                [0x01, 0x02, 0x03, 0x04],
            )
            .with_gas(100_000, Amount::from(1000u64)),
        )
    }

    #[test]
    fn test_encoding_layout() {
        let encoded = encode_subscription(&make_subscription());

        // 21 + 33 + 21 + 21 + 5 + 4 + 3 + 1 + 1 = 110 payload bytes
        assert_eq!(encoded.len(), 112);
        assert_eq!(&encoded[..2], &[0xf8, 0x6e]);
        assert_eq!(encoded[2], 0x94);
        assert!(encoded[3..23].iter().all(|b| *b == 0xAA));
        assert_eq!(encoded[23], 0xa0);
        assert_eq!(&encoded[98..103], &[0x84, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&encoded[103..107], &[0x83, 0x01, 0x86, 0xa0]);
        assert_eq!(&encoded[107..110], &[0x82, 0x03, 0xe8]);
        // zero deposit, active
        assert_eq!(&encoded[110..], &[0x80, 0x01]);
    }

    #[test]
    fn test_decode_recomputes_identity() {
        let mut original = make_subscription();
        original.deposit_balance = Amount::from(123_456_789u64);
        original.active = false;

        let decoded = decode_subscription(&encode_subscription(&original)).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(
            decoded.id,
            SubscriptionId::compute(
                &Address::repeat_byte(0xAA),
                &B256::repeat_byte(0x11),
                &Address::repeat_byte(0xBB)
            )
        );
    }

    #[test]
    fn test_large_amounts_survive() {
        let mut original = make_subscription();
        original.gas_price = "1000000000000000000000000000000000000000000".parse().unwrap();
        original.deposit_balance = original.gas_price.times_gas(u64::MAX);

        let decoded = decode_subscription(&encode_subscription(&original)).unwrap();
        assert_eq!(decoded.gas_price, original.gas_price);
        assert_eq!(decoded.deposit_balance, original.deposit_balance);
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut encoded = encode_subscription(&make_subscription());
        encoded.push(0x00);
        assert!(matches!(
            decode_subscription(&encoded),
            Err(SubscriptionError::Decode(_))
        ));
    }

    #[test]
    fn test_rejects_leading_zero_amount() {
        let mut encoded = encode_subscription(&make_subscription());
        encoded[108] = 0x00;
        encoded[109] = 0x05;
        assert!(matches!(
            decode_subscription(&encoded),
            Err(SubscriptionError::Decode(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_input() {
        let encoded = encode_subscription(&make_subscription());
        assert!(decode_subscription(&encoded[..50]).is_err());
        assert!(decode_subscription(&[]).is_err());
    }

    #[test]
    fn test_rejects_invalid_bool() {
        let mut encoded = encode_subscription(&make_subscription());
        encoded[111] = 0x02;
        assert!(decode_subscription(&encoded).is_err());
    }
}
