pub use alloy_primitives::{Address, U256};
use {
    chrono::{DateTime, Utc},
    std::{cmp::Ordering, fmt},
};

/// An ERC20 token address.
///
/// https://eips.ethereum.org/EIPS/eip-20
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, derive_more::From)]
pub struct TokenAddress(pub Address);

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TokenAddress> for Address {
    fn from(value: TokenAddress) -> Self {
        value.0
    }
}

/// An unordered pair of two distinct tokens, stored in canonical order.
///
/// The canonical order (lower address first) is the order a pool uses for
/// its reserves.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct TokenPair(TokenAddress, TokenAddress);

impl TokenPair {
    /// Create a new token pair from two addresses, `None` if they are equal.
    pub fn new(token_a: TokenAddress, token_b: TokenAddress) -> Option<Self> {
        match token_a.cmp(&token_b) {
            Ordering::Less => Some(Self(token_a, token_b)),
            Ordering::Equal => None,
            Ordering::Greater => Some(Self(token_b, token_a)),
        }
    }

    /// The first address is always the lower one.
    /// The addresses are never equal.
    pub fn get(&self) -> (TokenAddress, TokenAddress) {
        (self.0, self.1)
    }
}

/// The point in time after which a trade must not execute anymore.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Deadline(pub DateTime<Utc>);

impl Deadline {
    /// A deadline that never passes.
    pub fn never() -> Self {
        Self(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether a call executing at `now` is too late. Executing exactly at
    /// the deadline is still allowed.
    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        now > self.0
    }
}
