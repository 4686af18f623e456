//! The ledger the core reads pools from and submits trades to.
//!
//! Everything behind [`Chain`] (token balances, the pool registry, the pools
//! themselves and the router) is owned by the ledger. The core only ever
//! talks to it through this trait, within a single transaction.

use {
    crate::domain::eth::{Address, Deadline, TokenAddress, U256},
    chrono::{DateTime, Utc},
};

/// Reserves of a pool in its canonical token order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PairReserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub last_update: DateTime<Utc>,
}

/// A single hop exact input swap routed through a router.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExactInputSwap {
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub path: [TokenAddress; 2],
    pub recipient: Address,
    pub deadline: Deadline,
}

#[cfg_attr(test, mockall::automock)]
pub trait Chain {
    /// Time of the transaction currently executing.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Resolves the pool registered at `factory` for the two tokens, in either
    /// order.
    fn get_pair(
        &self,
        factory: Address,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Option<Address>;

    fn get_reserves(&self, pair: Address) -> Result<PairReserves, Error>;

    fn balance_of(&self, token: TokenAddress, owner: Address) -> U256;

    fn allowance(&self, token: TokenAddress, owner: Address, spender: Address) -> U256;

    /// Moves `amount` from `from` to `to` using the allowance `from` granted
    /// to `spender`.
    fn transfer_from(
        &mut self,
        token: TokenAddress,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error>;

    fn approve(
        &mut self,
        token: TokenAddress,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), Error>;

    /// Swaps through the router at `router` on behalf of `sender`, pulling the
    /// input with the allowance `sender` granted to the router. Returns the
    /// amount sent to the recipient.
    fn swap_exact_input(
        &mut self,
        router: Address,
        sender: Address,
        swap: ExactInputSwap,
    ) -> Result<U256, Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Error {
    #[error("transaction expired")]
    Expired,
    #[error("transfer amount exceeds balance")]
    InsufficientBalance,
    #[error("transfer amount exceeds allowance")]
    InsufficientAllowance,
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
    #[error("insufficient input amount")]
    InsufficientInputAmount,
    #[error("insufficient output amount")]
    InsufficientOutputAmount,
    #[error("invalid path")]
    InvalidPath,
    #[error("constant product invariant violated")]
    K,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("unknown pair {0}")]
    UnknownPair(Address),
    #[error("unknown token {0}")]
    UnknownToken(TokenAddress),
    #[error("unknown router {0}")]
    UnknownRouter(Address),
}
