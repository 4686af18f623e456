//! Reading pool reserves in the order the caller names the tokens.

use {
    crate::domain::{
        chain::{self, Chain},
        eth::{Address, TokenAddress, TokenPair},
        sizing::Reserves,
    },
    chrono::{DateTime, Utc},
};

/// Reserves of the pool for a pair of tokens, oriented as requested.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PoolReserves {
    pub pool: Address,
    pub reserves: Reserves,
    pub last_update: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug)]
pub struct ReserveView {
    factory: Address,
}

impl ReserveView {
    pub fn new(factory: Address) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    /// Returns `(reserve_a, reserve_b)` of the pool for `token_a` and
    /// `token_b`, reversing the pool's canonical order when `token_a` is not
    /// its first token.
    pub fn reserves<C>(
        &self,
        chain: &C,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<PoolReserves, Error>
    where
        C: Chain + ?Sized,
    {
        let pair = TokenPair::new(token_a, token_b).ok_or(Error::PoolNotFound)?;
        let pool = chain
            .get_pair(self.factory, token_a, token_b)
            .ok_or(Error::PoolNotFound)?;
        let state = chain.get_reserves(pool)?;

        let (token0, _) = pair.get();
        let reserves = if token_a == token0 {
            Reserves {
                a: state.reserve0,
                b: state.reserve1,
            }
        } else {
            Reserves {
                a: state.reserve1,
                b: state.reserve0,
            }
        };

        Ok(PoolReserves {
            pool,
            reserves,
            last_update: state.last_update,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("no pool registered for the token pair")]
    PoolNotFound,
    #[error(transparent)]
    Chain(#[from] chain::Error),
}
