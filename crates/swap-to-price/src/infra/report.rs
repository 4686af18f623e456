//! JSON reports printed by the CLI.

use {
    crate::domain::{
        eth::{Address, U256},
        reserves::PoolReserves,
        sizing::Direction,
    },
    chrono::{DateTime, Utc},
    number::serialization::HexOrDecimalU256,
    serde::Serialize,
    serde_with::{DisplayFromStr, serde_as},
};

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub address: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub reserve_a: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub reserve_b: U256,
    pub last_update: DateTime<Utc>,
}

impl From<PoolReserves> for Pool {
    fn from(pool: PoolReserves) -> Self {
        Self {
            address: pool.pool,
            reserve_a: pool.reserves.a,
            reserve_b: pool.reserves.b,
            last_update: pool.last_update,
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde_as(as = "DisplayFromStr")]
    pub direction: Direction,
    pub token_in: String,
    pub token_out: String,
    #[serde_as(as = "HexOrDecimalU256")]
    pub amount_in: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub amount_out: U256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub pool: Pool,
    /// `None` if the pool needs no trade.
    pub trade: Option<Trade>,
}

#[serde_as]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub owner: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub token_a: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub token_b: U256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub outcome: &'static str,
    pub trade: Option<Trade>,
    pub before: Pool,
    pub after: Pool,
    /// Balances of the recipient after the swap.
    pub recipient: Balances,
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn serializes_amounts_as_decimal_strings() {
        let quote = Quote {
            pool: Pool {
                address: Address::with_last_byte(0x11),
                reserve_a: U256::from(10),
                reserve_b: U256::MAX,
                last_update: DateTime::UNIX_EPOCH,
            },
            trade: Some(Trade {
                direction: Direction::BToA,
                token_in: "SLV".to_owned(),
                token_out: "GLD".to_owned(),
                amount_in: U256::from(1000),
                amount_out: U256::from(9),
            }),
        };

        assert_eq!(
            serde_json::to_value(&quote).unwrap(),
            json!({
                "pool": {
                    "address": "0x0000000000000000000000000000000000000011",
                    "reserveA": "10",
                    "reserveB": U256::MAX.to_string(),
                    "lastUpdate": "1970-01-01T00:00:00Z",
                },
                "trade": {
                    "direction": "BToA",
                    "tokenIn": "SLV",
                    "tokenOut": "GLD",
                    "amountIn": "1000",
                    "amountOut": "9",
                },
            })
        );
    }
}
