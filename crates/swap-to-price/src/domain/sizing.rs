//! Sizing of the single trade that moves a constant product pool to a target
//! price.
//!
//! For a pool with reserves `(x, y)`, invariant `k = x * y` and a fee factor
//! `γ` (the fraction of the input that reaches the pool), selling `Δ` of the
//! input token leaves the pool at a marginal price of `y' / (x + γΔ)`. Equating
//! that with the target price and solving the invariant for `Δ` gives
//!
//! ```text
//! Δ = sqrt(k * p_in / (p_out * γ)) - x / γ
//! ```
//!
//! which is only positive when the pool is off target in the direction the
//! trade moves it. All arithmetic is integer arithmetic on 512-bit
//! intermediates, so results are exact up to the truncation of each
//! division.

use {
    crate::domain::eth::U256,
    alloy_primitives::U512,
    number::{U256Ext, full_mul_div, isqrt},
    std::fmt,
};

/// Current reserves of a pool in the order the caller named its tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reserves {
    pub a: U256,
    pub b: U256,
}

/// Target price ratio between token A and token B.
///
/// The pool is on target when `reserve_a : reserve_b == numerator :
/// denominator`, i.e. one unit of token A is worth `denominator / numerator`
/// units of token B.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Price {
    pub numerator: U256,
    pub denominator: U256,
}

impl Price {
    pub fn new(numerator: U256, denominator: U256) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero() || self.denominator.is_zero()
    }
}

/// Fee factor of a pool: the fraction `numerator / denominator` of every
/// input amount that counts towards the invariant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fee {
    numerator: u32,
    denominator: u32,
}

impl Fee {
    /// The 0.3% fee of Uniswap V2 style pools.
    pub const UNISWAP_V2: Self = Self {
        numerator: 997,
        denominator: 1000,
    };

    pub fn new(numerator: u32, denominator: u32) -> Result<Self, InvalidFee> {
        if numerator == 0 || numerator > denominator {
            return Err(InvalidFee {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }
}

impl Default for Fee {
    fn default() -> Self {
        Self::UNISWAP_V2
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid fee factor {numerator}/{denominator}")]
pub struct InvalidFee {
    pub numerator: u32,
    pub denominator: u32,
}

/// Which token a trade sells into the pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum Direction {
    /// Token A goes in, token B comes out.
    AToB,
    /// Token B goes in, token A comes out.
    BToA,
}

/// The computed trade. A zero `amount_in` means the pool needs no trade.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Trade {
    pub direction: Direction,
    pub amount_in: U256,
}

impl Trade {
    pub fn noop() -> Self {
        Self {
            direction: Direction::AToB,
            amount_in: U256::ZERO,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.amount_in.is_zero()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("price and reserves must be non-zero")]
    ZeroPrice,
    #[error("arithmetic overflow while sizing the trade")]
    ArithmeticOverflow,
}

/// Computes the trade that moves a pool with `reserves` to `price`.
pub fn compute_trade(reserves: Reserves, price: Price, fee: Fee) -> Result<Trade, Error> {
    if price.is_zero() || reserves.a.is_zero() || reserves.b.is_zero() {
        return Err(Error::ZeroPrice);
    }

    let (reserve_a, reserve_b) = (reserves.a.widen(), reserves.b.widen());
    let (numerator, denominator) = (price.numerator.widen(), price.denominator.widen());

    // The pool is too cheap in B (relative to the target) exactly when
    // `reserve_a / reserve_b < numerator / denominator`, in which case selling
    // A moves it towards the target.
    let current = reserve_a
        .checked_mul(denominator)
        .ok_or(Error::ArithmeticOverflow)?;
    let target = reserve_b
        .checked_mul(numerator)
        .ok_or(Error::ArithmeticOverflow)?;
    if current == target {
        return Ok(Trade::noop());
    }
    let direction = if current < target {
        Direction::AToB
    } else {
        Direction::BToA
    };

    let (reserve_in, price_in, price_out) = match direction {
        Direction::AToB => (reserve_a, numerator, denominator),
        Direction::BToA => (reserve_b, denominator, numerator),
    };
    let fee_numerator = U512::from(fee.numerator);
    let fee_denominator = U512::from(fee.denominator);

    let invariant = reserve_a
        .checked_mul(reserve_b)
        .and_then(|k| k.checked_mul(fee_denominator))
        .ok_or(Error::ArithmeticOverflow)?;
    let scaled_price_out = price_out
        .checked_mul(fee_numerator)
        .ok_or(Error::ArithmeticOverflow)?;
    let left = isqrt(
        full_mul_div(invariant, price_in, scaled_price_out).ok_or(Error::ArithmeticOverflow)?,
    );
    let right = reserve_in
        .checked_mul(fee_denominator)
        .ok_or(Error::ArithmeticOverflow)?
        / fee_numerator;

    // Integer truncation can leave the pool marginally past the point where
    // the fee eats the gain, in which case there is nothing to trade.
    if left <= right {
        return Ok(Trade {
            direction,
            amount_in: U256::ZERO,
        });
    }

    let amount_in = U256::checked_narrow(&(left - right)).ok_or(Error::ArithmeticOverflow)?;
    Ok(Trade {
        direction,
        amount_in,
    })
}

/// Given an input amount of a token and the pool reserves, returns the
/// maximum output amount of the other token. Returns `None` for zero amounts
/// or reserves and on overflow.
pub fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256, fee: Fee) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }

    let amount_in_with_fee = amount_in.checked_mul(U256::from(fee.numerator))?;
    let numerator = amount_in_with_fee.widen().checked_mul(reserve_out.widen())?;
    let denominator = reserve_in
        .checked_mul(U256::from(fee.denominator))?
        .checked_add(amount_in_with_fee)?;
    U256::checked_narrow(&(numerator / denominator.widen()))
}
