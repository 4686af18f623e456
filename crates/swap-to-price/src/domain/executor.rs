//! The guarded entry point that sizes and executes a swap to a target price.
//!
//! The executor is stateless apart from its immutable configuration: the
//! address it acts as on the ledger, the pool registry it resolves pools
//! from, the router it trades through and the pool fee. Each call reads the
//! pool, sizes the trade, checks it against the caller's spend caps and then
//! pulls the input from the caller, approves the router and swaps. Any
//! failure aborts the call; the ledger transaction wrapping it discards all
//! partial effects.

use {
    crate::{
        domain::{
            chain::{self, Chain, ExactInputSwap},
            eth::{Address, Deadline, TokenAddress, U256},
            reserves::{self, PoolReserves, ReserveView},
            sizing::{self, Direction, Fee, Price, Trade},
        },
        infra::observe,
    },
    tracing::instrument,
};

/// Immutable configuration of a [`GuardedExecutor`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// The address the executor holds funds and grants allowances as.
    pub address: Address,
    /// Registry used to resolve the pool of a token pair.
    pub factory: Address,
    /// Router the swaps are submitted through.
    pub router: Address,
    /// Fee charged by the pools the registry creates.
    pub fee: Fee,
}

#[derive(Debug)]
pub struct GuardedExecutor {
    address: Address,
    router: Address,
    fee: Fee,
    reserves: ReserveView,
}

/// Maximum amounts of each token the caller is willing to sell.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SpendCaps {
    pub a: U256,
    pub b: U256,
}

impl SpendCaps {
    pub fn is_zero(&self) -> bool {
        self.a.is_zero() && self.b.is_zero()
    }

    /// The cap of the token sold in `direction`.
    pub fn for_direction(&self, direction: Direction) -> U256 {
        match direction {
            Direction::AToB => self.a,
            Direction::BToA => self.b,
        }
    }
}

/// A request to move the pool of `token_a` and `token_b` to `price`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwapToPrice {
    pub token_a: TokenAddress,
    pub token_b: TokenAddress,
    pub price: Price,
    pub max_spend: SpendCaps,
    pub recipient: Address,
    pub deadline: Deadline,
}

/// A swap that was executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Swap {
    pub pool: Address,
    pub direction: Direction,
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The pool was already at the target (or closer to it than a trade net
    /// of fees could bring it). Nothing was transferred.
    NoOp,
    Swapped(Swap),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoOp => "noop",
            Self::Swapped(_) => "swapped",
        }
    }
}

impl GuardedExecutor {
    pub fn new(config: Config) -> Self {
        Self {
            address: config.address,
            router: config.router,
            fee: config.fee,
            reserves: ReserveView::new(config.factory),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.reserves.factory()
    }

    pub fn router(&self) -> Address {
        self.router
    }

    pub fn fee(&self) -> Fee {
        self.fee
    }

    /// Sizes the trade that would move the pool of `token_a` and `token_b` to
    /// `price` without changing anything.
    pub fn quote<C>(
        &self,
        chain: &C,
        token_a: TokenAddress,
        token_b: TokenAddress,
        price: Price,
    ) -> Result<(PoolReserves, Trade), Error>
    where
        C: Chain + ?Sized,
    {
        if price.is_zero() {
            return Err(Error::ZeroPrice);
        }
        let pool = self.reserves.reserves(chain, token_a, token_b)?;
        let trade = sizing::compute_trade(pool.reserves, price, self.fee)?;
        Ok((pool, trade))
    }

    /// Trades `caller`'s funds so that the pool ends up at the requested
    /// price, sending the proceeds to the request's recipient.
    #[instrument(
        skip_all,
        fields(
            caller = %caller,
            token_a = %request.token_a,
            token_b = %request.token_b,
        )
    )]
    pub fn swap_to_price<C>(
        &self,
        chain: &mut C,
        caller: Address,
        request: &SwapToPrice,
    ) -> Result<Outcome, Error>
    where
        C: Chain + ?Sized,
    {
        let result = self.execute(chain, caller, request);
        match &result {
            Ok(outcome) => {
                tracing::debug!(?outcome, "swap to price finished");
                observe::swapped(outcome);
            }
            Err(err) => {
                tracing::warn!(?err, "swap to price failed");
                observe::swap_error(err);
            }
        }
        result
    }

    fn execute<C>(
        &self,
        chain: &mut C,
        caller: Address,
        request: &SwapToPrice,
    ) -> Result<Outcome, Error>
    where
        C: Chain + ?Sized,
    {
        if request.price.is_zero() {
            return Err(Error::ZeroPrice);
        }
        if request.max_spend.is_zero() {
            return Err(Error::ZeroSpend);
        }
        if request.deadline.has_passed(chain.timestamp()) {
            return Err(Error::Expired);
        }

        let (pool, trade) = self.quote(&*chain, request.token_a, request.token_b, request.price)?;
        tracing::debug!(?pool, ?trade, "sized trade");
        if trade.is_noop() {
            return Ok(Outcome::NoOp);
        }

        let max_spend = request.max_spend.for_direction(trade.direction);
        if trade.amount_in > max_spend {
            return Err(Error::SpendCapExceeded {
                amount_in: trade.amount_in,
                max_spend,
            });
        }

        let (token_in, token_out) = match trade.direction {
            Direction::AToB => (request.token_a, request.token_b),
            Direction::BToA => (request.token_b, request.token_a),
        };
        chain.transfer_from(
            token_in,
            self.address,
            caller,
            self.address,
            trade.amount_in,
        )?;
        chain.approve(token_in, self.address, self.router, trade.amount_in)?;
        let amount_out = chain.swap_exact_input(
            self.router,
            self.address,
            ExactInputSwap {
                amount_in: trade.amount_in,
                // The trade is sized from the reserves read in this same
                // transaction, so there is no slippage to protect against.
                min_amount_out: U256::ZERO,
                path: [token_in, token_out],
                recipient: request.recipient,
                deadline: request.deadline,
            },
        )?;

        Ok(Outcome::Swapped(Swap {
            pool: pool.pool,
            direction: trade.direction,
            token_in,
            token_out,
            amount_in: trade.amount_in,
            amount_out,
        }))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Error {
    #[error("target price must be non-zero")]
    ZeroPrice,
    #[error("at least one spend cap must be non-zero")]
    ZeroSpend,
    #[error("deadline has passed")]
    Expired,
    #[error("trade needs {amount_in} but the spend cap is {max_spend}")]
    SpendCapExceeded { amount_in: U256, max_spend: U256 },
    #[error("no pool registered for the token pair")]
    PoolNotFound,
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error(transparent)]
    Chain(chain::Error),
}

impl Error {
    /// A short, stable name of the error, used as a metric label.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<chain::Error> for Error {
    fn from(err: chain::Error) -> Self {
        match err {
            chain::Error::Overflow => Self::ArithmeticOverflow,
            err => Self::Chain(err),
        }
    }
}

impl From<reserves::Error> for Error {
    fn from(err: reserves::Error) -> Self {
        match err {
            reserves::Error::PoolNotFound => Self::PoolNotFound,
            reserves::Error::Chain(err) => err.into(),
        }
    }
}

impl From<sizing::Error> for Error {
    fn from(err: sizing::Error) -> Self {
        match err {
            sizing::Error::ZeroPrice => Self::ZeroPrice,
            sizing::Error::ArithmeticOverflow => Self::ArithmeticOverflow,
        }
    }
}
