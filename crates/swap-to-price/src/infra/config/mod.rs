use {
    crate::domain::{
        eth::{Address, TokenAddress, U256},
        executor,
        sizing::Reserves,
    },
    alloy_primitives::B256,
};

pub mod file;

/// A ledger to simulate against: the deployed tokens, the pool registry and
/// router, the seeded pools and the executor.
#[derive(Clone, Debug)]
pub struct Scenario {
    /// The account holding the token supplies. It seeds the pools and is the
    /// caller of simulated swaps.
    pub owner: Address,
    pub executor: executor::Config,
    pub init_code_digest: B256,
    pub tokens: Vec<Token>,
    pub pools: Vec<Pool>,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub symbol: String,
    pub address: TokenAddress,
    pub supply: U256,
}

/// A pool seeded with `reserves`, in the order its tokens are listed.
#[derive(Clone, Copy, Debug)]
pub struct Pool {
    pub token_a: TokenAddress,
    pub token_b: TokenAddress,
    pub reserves: Reserves,
}

impl Scenario {
    /// Resolves a token by its symbol (case insensitive) or its address.
    pub fn token(&self, token: &str) -> Option<TokenAddress> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(token))
            .map(|t| t.address)
            .or_else(|| token.parse().ok().map(TokenAddress))
    }
}
