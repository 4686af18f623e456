use alloy_primitives::U256;

/// Scale of a token with 18 decimals.
pub const WAD: u128 = 1_000_000_000_000_000_000;

pub trait EthUnit: std::marker::Sized {
    /// Returns the current wei amount.
    fn wei(self) -> U256;

    /// Returns the current Eth amount as wei (i.e. 1e18 wei). Also used for
    /// whole units of any 18 decimal token.
    fn eth(self) -> U256 {
        self.wei() * U256::from(WAD)
    }
}

impl EthUnit for u64 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

impl EthUnit for u128 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales() {
        assert_eq!(7u64.wei(), U256::from(7));
        assert_eq!(
            1000u128.eth(),
            "1000000000000000000000".parse::<U256>().unwrap()
        );
    }
}
