use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Token metadata carried by a pair creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub decimals: u8,
}

/// Constant-product pair events, in the order they were emitted on chain.
///
/// Amounts and reserves are raw integers (no decimal point applied), encoded
/// as JSON strings so 112-bit reserves survive decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolEvent {
    PairCreated {
        pair: Address,
        token0: TokenInfo,
        token1: TokenInfo,
        block_number: u64,
        #[serde(default)]
        timestamp: u64,
    },
    Sync {
        pair: Address,
        reserve0: BigDecimal,
        reserve1: BigDecimal,
        block_number: u64,
        #[serde(default)]
        timestamp: u64,
    },
    Swap {
        pair: Address,
        amount0_in: BigDecimal,
        amount1_in: BigDecimal,
        amount0_out: BigDecimal,
        amount1_out: BigDecimal,
        block_number: u64,
        #[serde(default)]
        timestamp: u64,
    },
    Mint {
        pair: Address,
        amount0: BigDecimal,
        amount1: BigDecimal,
        block_number: u64,
        #[serde(default)]
        timestamp: u64,
    },
    Burn {
        pair: Address,
        amount0: BigDecimal,
        amount1: BigDecimal,
        block_number: u64,
        #[serde(default)]
        timestamp: u64,
    },
}

impl PoolEvent {
    pub fn pair(&self) -> Address {
        match self {
            PoolEvent::PairCreated { pair, .. }
            | PoolEvent::Sync { pair, .. }
            | PoolEvent::Swap { pair, .. }
            | PoolEvent::Mint { pair, .. }
            | PoolEvent::Burn { pair, .. } => *pair,
        }
    }

    pub fn block_number(&self) -> u64 {
        match self {
            PoolEvent::PairCreated { block_number, .. }
            | PoolEvent::Sync { block_number, .. }
            | PoolEvent::Swap { block_number, .. }
            | PoolEvent::Mint { block_number, .. }
            | PoolEvent::Burn { block_number, .. } => *block_number,
        }
    }

    /// Raw integer amounts carried by the event, keyed by field name.
    pub fn raw_amounts(&self) -> Vec<(&'static str, &BigDecimal)> {
        match self {
            PoolEvent::PairCreated { .. } => Vec::new(),
            PoolEvent::Sync {
                reserve0, reserve1, ..
            } => vec![("reserve0", reserve0), ("reserve1", reserve1)],
            PoolEvent::Swap {
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                ..
            } => vec![
                ("amount0_in", amount0_in),
                ("amount1_in", amount1_in),
                ("amount0_out", amount0_out),
                ("amount1_out", amount1_out),
            ],
            PoolEvent::Mint {
                amount0, amount1, ..
            }
            | PoolEvent::Burn {
                amount0, amount1, ..
            } => vec![("amount0", amount0), ("amount1", amount1)],
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            PoolEvent::PairCreated { .. } => "pair_created",
            PoolEvent::Sync { .. } => "sync",
            PoolEvent::Swap { .. } => "swap",
            PoolEvent::Mint { .. } => "mint",
            PoolEvent::Burn { .. } => "burn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decode_sync_event() {
        let line = r#"{"type":"sync","pair":"0x077932dc0ae0db9ed1535d20977aee4fdf30bfec","reserve0":"5192296858534827628530496329220095","reserve1":"1000","block_number":7}"#;
        let event: PoolEvent = serde_json::from_str(line).unwrap();

        match &event {
            PoolEvent::Sync {
                reserve0,
                timestamp,
                ..
            } => {
                assert_eq!(
                    *reserve0,
                    BigDecimal::from_str("5192296858534827628530496329220095").unwrap()
                );
                assert_eq!(*timestamp, 0);
            },
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(event.block_number(), 7);
        assert_eq!(event.event_type(), "sync");
        assert_eq!(event.raw_amounts().len(), 2);
    }

    #[test]
    fn test_decode_pair_created_event() {
        let line = r#"{"type":"pair_created","pair":"0x00000000000000000000000000000000000000aa","token0":{"address":"0x0000000000000000000000000000000000000001","symbol":"A","decimals":18},"token1":{"address":"0x0000000000000000000000000000000000000002","symbol":"B","name":"Bee","decimals":6},"block_number":1,"timestamp":1700000000}"#;
        let event: PoolEvent = serde_json::from_str(line).unwrap();

        let PoolEvent::PairCreated { token0, token1, .. } = &event else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(token0.symbol, "A");
        assert_eq!(token0.name, "");
        assert_eq!(token1.decimals, 6);
        assert!(event.raw_amounts().is_empty());
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let line = r#"{"type":"collect","pair":"0x00000000000000000000000000000000000000aa","block_number":1}"#;
        assert!(serde_json::from_str::<PoolEvent>(line).is_err());
    }
}
