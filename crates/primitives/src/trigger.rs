//! This module contains the semantic trigger records and their codecs.
//!
//! On-chain, trigger parameters are ABI-encoded byte strings. Off-chain
//! tooling also writes a convenience JSON form into the same field. Both
//! forms decode into the one [TriggerData] variant per trigger family; the
//! payload is sniffed as JSON when its first non-whitespace byte is `{`.

use crate::{CodecError, TriggerKind};
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_sol_types::{sol_data, SolType};

/// Scale factor of ABI-encoded price thresholds.
const THRESHOLD_SCALE: f64 = 1e18;

/// ABI layout of a TIME trigger: `(uint256 interval_seconds)`.
type TimeAbi = sol_data::Uint<256>;
/// ABI layout of a PRICE trigger: `(bytes32 symbol, uint256 threshold, uint8 direction)`.
type PriceAbi = (sol_data::FixedBytes<32>, sol_data::Uint<256>, sol_data::Uint<8>);
/// ABI layout of a WALLET_EVENT trigger: `(address token_or_zero, uint8 event_type)`.
type WalletEventAbi = (sol_data::Address, sol_data::Uint<8>);

/// A comparison operator applied to `(current_price, threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Comparator {
    /// Ready iff `price < threshold`.
    Lt,
    /// Ready iff `price <= threshold`.
    Le,
    /// Ready iff `price > threshold`.
    Gt,
    /// Ready iff `price >= threshold`.
    Ge,
}

impl Comparator {
    /// Applies the comparator to the given operands.
    pub fn compare(&self, price: f64, threshold: f64) -> bool {
        match self {
            Self::Lt => price < threshold,
            Self::Le => price <= threshold,
            Self::Gt => price > threshold,
            Self::Ge => price >= threshold,
        }
    }
}

impl TryFrom<u8> for Comparator {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Lt),
            1 => Ok(Self::Le),
            2 => Ok(Self::Gt),
            3 => Ok(Self::Ge),
            _ => Err(CodecError::UnknownDiscriminant { field: "comparator", value }),
        }
    }
}

impl From<Comparator> for u8 {
    fn from(comparator: Comparator) -> Self {
        match comparator {
            Comparator::Lt => 0,
            Comparator::Le => 1,
            Comparator::Gt => 2,
            Comparator::Ge => 3,
        }
    }
}

/// The direction of a watched wallet event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransferDirection {
    /// A transfer into the monitored wallet.
    In,
    /// A transfer out of the monitored wallet.
    Out,
    /// Any balance change.
    BalanceChange,
}

impl TryFrom<u8> for TransferDirection {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::In),
            1 => Ok(Self::Out),
            2 => Ok(Self::BalanceChange),
            _ => Err(CodecError::UnknownDiscriminant { field: "event_type", value }),
        }
    }
}

impl From<TransferDirection> for u8 {
    fn from(direction: TransferDirection) -> Self {
        match direction {
            TransferDirection::In => 0,
            TransferDirection::Out => 1,
            TransferDirection::BalanceChange => 2,
        }
    }
}

/// A decoded trigger record.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerData {
    /// Time trigger parameters.
    Time {
        /// Reschedule interval in seconds.
        interval: u64,
    },
    /// Price trigger parameters.
    Price {
        /// Asset symbol or oracle id (e.g. "eth", "ethereum").
        token: String,
        /// The comparison to apply.
        comparator: Comparator,
        /// The threshold in USD.
        price_usd: f64,
    },
    /// Wallet event trigger parameters.
    WalletEvent {
        /// The wallet to watch. The on-chain ABI form carries no monitor
        /// address; `None` means the workflow owner.
        monitor: Option<Address>,
        /// Token contract to scan, or `None` for native transfers.
        token: Option<Address>,
        /// Minimum transfer value that qualifies.
        min_amount: U256,
        /// Which direction of movement qualifies.
        direction: TransferDirection,
    },
}

/// JSON convenience form of a TIME trigger.
#[derive(serde::Deserialize)]
struct TimeJson {
    interval: u64,
}

/// JSON convenience form of a PRICE trigger.
#[derive(serde::Deserialize)]
struct PriceJson {
    token: String,
    #[serde(default)]
    comparator: u8,
    #[serde(default)]
    price_usd: f64,
}

/// JSON convenience form of a WALLET_EVENT trigger.
#[derive(serde::Deserialize)]
struct WalletEventJson {
    monitor: Address,
    #[serde(default)]
    token: Option<Address>,
    #[serde(default)]
    min_amount: u128,
}

impl TriggerData {
    /// Decodes trigger parameters for the given trigger family, accepting
    /// either the on-chain ABI form or the convenience JSON form.
    pub fn decode(kind: TriggerKind, data: &[u8]) -> Result<Self, CodecError> {
        if looks_like_json(data) {
            Self::decode_json(kind, data)
        } else {
            Self::decode_abi(kind, data)
        }
    }

    /// Decodes the on-chain ABI form.
    pub fn decode_abi(kind: TriggerKind, data: &[u8]) -> Result<Self, CodecError> {
        match kind {
            TriggerKind::Time => {
                let interval = TimeAbi::abi_decode(data, true)?;
                let interval =
                    u64::try_from(interval).map_err(|_| CodecError::OutOfRange("interval"))?;
                Ok(Self::Time { interval })
            }
            TriggerKind::Price => {
                let (symbol, threshold, direction) = PriceAbi::abi_decode_params(data, true)?;
                let token = bytes32_to_symbol(&symbol)?;
                let threshold =
                    u128::try_from(threshold).map_err(|_| CodecError::OutOfRange("threshold"))?;
                let comparator = match direction {
                    0 => Comparator::Gt,
                    1 => Comparator::Lt,
                    value => {
                        return Err(CodecError::UnknownDiscriminant { field: "direction", value })
                    }
                };
                Ok(Self::Price { token, comparator, price_usd: threshold as f64 / THRESHOLD_SCALE })
            }
            TriggerKind::WalletEvent => {
                let (token, event_type) = WalletEventAbi::abi_decode_params(data, true)?;
                let direction = TransferDirection::try_from(event_type)?;
                Ok(Self::WalletEvent {
                    monitor: None,
                    token: (token != Address::ZERO).then_some(token),
                    min_amount: U256::ZERO,
                    direction,
                })
            }
        }
    }

    /// Decodes the convenience JSON form.
    pub fn decode_json(kind: TriggerKind, data: &[u8]) -> Result<Self, CodecError> {
        match kind {
            TriggerKind::Time => {
                let record: TimeJson = serde_json::from_slice(data)?;
                Ok(Self::Time { interval: record.interval })
            }
            TriggerKind::Price => {
                let record: PriceJson = serde_json::from_slice(data)?;
                Ok(Self::Price {
                    token: record.token,
                    comparator: Comparator::try_from(record.comparator)?,
                    price_usd: record.price_usd,
                })
            }
            TriggerKind::WalletEvent => {
                let record: WalletEventJson = serde_json::from_slice(data)?;
                Ok(Self::WalletEvent {
                    monitor: Some(record.monitor),
                    token: record.token,
                    min_amount: U256::from(record.min_amount),
                    direction: TransferDirection::In,
                })
            }
        }
    }

    /// Encodes the record into its on-chain ABI form.
    ///
    /// Not every semantic record is representable: `<=`/`>=` comparators and
    /// wallet-event records carrying an explicit monitor or minimum amount
    /// only exist in the JSON form.
    pub fn abi_encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Time { interval } => Ok(TimeAbi::abi_encode(&U256::from(*interval))),
            Self::Price { token, comparator, price_usd } => {
                let direction: u8 = match comparator {
                    Comparator::Gt => 0,
                    Comparator::Lt => 1,
                    _ => return Err(CodecError::Unrepresentable("comparator")),
                };
                if !price_usd.is_finite() || *price_usd < 0.0 {
                    return Err(CodecError::OutOfRange("price_usd"));
                }
                let threshold = (price_usd * THRESHOLD_SCALE).round();
                if threshold >= u128::MAX as f64 {
                    return Err(CodecError::OutOfRange("price_usd"));
                }
                Ok(PriceAbi::abi_encode_params(&(
                    symbol_to_bytes32(token)?,
                    U256::from(threshold as u128),
                    direction,
                )))
            }
            Self::WalletEvent { monitor, token, min_amount, direction } => {
                if monitor.is_some() || !min_amount.is_zero() {
                    return Err(CodecError::Unrepresentable("monitor/min_amount"));
                }
                Ok(WalletEventAbi::abi_encode_params(&(
                    token.unwrap_or(Address::ZERO),
                    u8::from(*direction),
                )))
            }
        }
    }

    /// Returns the trigger family of this record.
    pub const fn kind(&self) -> TriggerKind {
        match self {
            Self::Time { .. } => TriggerKind::Time,
            Self::Price { .. } => TriggerKind::Price,
            Self::WalletEvent { .. } => TriggerKind::WalletEvent,
        }
    }
}

/// Returns true if the payload's first non-whitespace byte opens a JSON object.
fn looks_like_json(data: &[u8]) -> bool {
    data.iter().find(|b| !b.is_ascii_whitespace()).is_some_and(|b| *b == b'{')
}

/// Converts a NUL-padded bytes32 symbol into a string.
fn bytes32_to_symbol(raw: &FixedBytes<32>) -> Result<String, CodecError> {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(32);
    String::from_utf8(raw[..end].to_vec()).map_err(|e| CodecError::Abi(e.to_string()))
}

/// Converts a symbol into a NUL-padded bytes32. Symbols longer than 32 bytes
/// have no ABI representation.
fn symbol_to_bytes32(symbol: &str) -> Result<FixedBytes<32>, CodecError> {
    let raw = symbol.as_bytes();
    if raw.len() > 32 {
        return Err(CodecError::Unrepresentable("symbol"));
    }
    let mut padded = [0u8; 32];
    padded[..raw.len()].copy_from_slice(raw);
    Ok(FixedBytes::from(padded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_boundary_semantics() {
        assert!(!Comparator::Lt.compare(2000.0, 2000.0));
        assert!(Comparator::Le.compare(2000.0, 2000.0));
        assert!(!Comparator::Gt.compare(2000.0, 2000.0));
        assert!(Comparator::Ge.compare(2000.0, 2000.0));
        assert!(Comparator::Lt.compare(1999.5, 2000.0));
        assert!(Comparator::Gt.compare(2000.5, 2000.0));
    }

    #[test]
    fn test_time_abi_round_trip() {
        let record = TriggerData::Time { interval: 3600 };
        let encoded = record.abi_encode().unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(TriggerData::decode_abi(TriggerKind::Time, &encoded).unwrap(), record);
    }

    #[test]
    fn test_price_abi_round_trip() {
        for comparator in [Comparator::Gt, Comparator::Lt] {
            let record = TriggerData::Price {
                token: "eth".to_string(),
                comparator,
                price_usd: 2000.0,
            };
            let encoded = record.abi_encode().unwrap();
            assert_eq!(TriggerData::decode_abi(TriggerKind::Price, &encoded).unwrap(), record);
        }
    }

    #[test]
    fn test_price_abi_rejects_inclusive_comparators() {
        let record =
            TriggerData::Price { token: "eth".to_string(), comparator: Comparator::Le, price_usd: 1.0 };
        assert!(matches!(record.abi_encode(), Err(CodecError::Unrepresentable(_))));
    }

    #[test]
    fn test_wallet_event_abi_round_trip() {
        let token = Address::repeat_byte(0xBB);
        let record = TriggerData::WalletEvent {
            monitor: None,
            token: Some(token),
            min_amount: U256::ZERO,
            direction: TransferDirection::In,
        };
        let encoded = record.abi_encode().unwrap();
        assert_eq!(TriggerData::decode_abi(TriggerKind::WalletEvent, &encoded).unwrap(), record);

        // The zero address means "native", which decodes to no token.
        let native = TriggerData::WalletEvent {
            monitor: None,
            token: None,
            min_amount: U256::ZERO,
            direction: TransferDirection::BalanceChange,
        };
        let encoded = native.abi_encode().unwrap();
        assert_eq!(TriggerData::decode_abi(TriggerKind::WalletEvent, &encoded).unwrap(), native);
    }

    #[test]
    fn test_price_json_form() {
        let raw = br#"{"token": "ethereum", "comparator": 0, "price_usd": 2000.0}"#;
        let record = TriggerData::decode(TriggerKind::Price, raw).unwrap();
        assert_eq!(
            record,
            TriggerData::Price {
                token: "ethereum".to_string(),
                comparator: Comparator::Lt,
                price_usd: 2000.0
            }
        );
    }

    #[test]
    fn test_wallet_event_json_form() {
        let raw = br#"{"monitor": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "token": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "min_amount": 1000}"#;
        let record = TriggerData::decode(TriggerKind::WalletEvent, raw).unwrap();
        assert_eq!(
            record,
            TriggerData::WalletEvent {
                monitor: Some(Address::repeat_byte(0xAA)),
                token: Some(Address::repeat_byte(0xBB)),
                min_amount: U256::from(1000u64),
                direction: TransferDirection::In,
            }
        );
    }

    #[test]
    fn test_json_sniffing_tolerates_leading_whitespace() {
        let raw = b"  \n {\"interval\": 60}";
        let record = TriggerData::decode(TriggerKind::Time, raw).unwrap();
        assert_eq!(record, TriggerData::Time { interval: 60 });
    }

    #[test]
    fn test_malformed_abi_is_an_error() {
        assert!(TriggerData::decode(TriggerKind::Price, &[0xde, 0xad]).is_err());
        assert!(TriggerData::decode(TriggerKind::Time, &[]).is_err());
    }
}
