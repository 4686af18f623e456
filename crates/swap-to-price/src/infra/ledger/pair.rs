use {
    super::Transaction,
    crate::domain::{
        chain::{Error, PairReserves},
        eth::{Address, TokenPair, U256},
        sizing::Fee,
    },
    chrono::{DateTime, Utc},
    number::U256Ext,
    std::sync::LazyLock,
};

/// Reserves are stored in 112 bits each.
pub static POOL_MAX_RESERVES: LazyLock<U256> = LazyLock::new(|| U256::from((1u128 << 112) - 1));

/// A constant product pool. Its reserves lag its token balances until the
/// next sync.
#[derive(Clone, Copy, Debug)]
pub struct Pair {
    tokens: TokenPair,
    fee: Fee,
    reserve0: U256,
    reserve1: U256,
    last_update: DateTime<Utc>,
}

impl Pair {
    pub fn new(tokens: TokenPair, fee: Fee) -> Self {
        Self {
            tokens,
            fee,
            reserve0: U256::ZERO,
            reserve1: U256::ZERO,
            last_update: DateTime::UNIX_EPOCH,
        }
    }

    pub fn tokens(&self) -> TokenPair {
        self.tokens
    }

    pub fn fee(&self) -> Fee {
        self.fee
    }

    pub fn reserves(&self) -> PairReserves {
        PairReserves {
            reserve0: self.reserve0,
            reserve1: self.reserve1,
            last_update: self.last_update,
        }
    }

    fn update(&mut self, balance0: U256, balance1: U256, now: DateTime<Utc>) -> Result<(), Error> {
        if balance0 > *POOL_MAX_RESERVES || balance1 > *POOL_MAX_RESERVES {
            return Err(Error::Overflow);
        }
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.last_update = now;
        Ok(())
    }

    /// Checks that the balances after a swap, net of the fee on the amounts
    /// that came in, keep the product of the reserves from decreasing.
    fn check_invariant(
        &self,
        balance0: U256,
        balance1: U256,
        amount0_in: U256,
        amount1_in: U256,
    ) -> Result<(), Error> {
        let fee_denominator = U256::from(self.fee.denominator()).widen();
        let fee_charged = U256::from(self.fee.denominator() - self.fee.numerator()).widen();
        let adjusted = |balance: U256, amount_in: U256| {
            balance
                .widen()
                .checked_mul(fee_denominator)?
                .checked_sub(amount_in.widen().checked_mul(fee_charged)?)
        };

        let balance0_adjusted = adjusted(balance0, amount0_in).ok_or(Error::Overflow)?;
        let balance1_adjusted = adjusted(balance1, amount1_in).ok_or(Error::Overflow)?;
        let after = balance0_adjusted
            .checked_mul(balance1_adjusted)
            .ok_or(Error::Overflow)?;
        let before = self
            .reserve0
            .widen()
            .checked_mul(self.reserve1.widen())
            .and_then(|k| k.checked_mul(fee_denominator * fee_denominator))
            .ok_or(Error::Overflow)?;

        if after < before {
            return Err(Error::K);
        }
        Ok(())
    }
}

impl Transaction {
    pub(super) fn pair(&self, pair: Address) -> Result<Pair, Error> {
        self.state
            .pairs
            .get(&pair)
            .copied()
            .ok_or(Error::UnknownPair(pair))
    }

    /// Sets the reserves of `pair` to its current token balances.
    pub fn sync(&mut self, pair: Address) -> Result<(), Error> {
        let mut state = self.pair(pair)?;
        let (token0, token1) = state.tokens.get();
        let balance0 = self.token(token0)?.balance_of(pair);
        let balance1 = self.token(token1)?.balance_of(pair);
        state.update(balance0, balance1, self.timestamp)?;
        self.state.pairs.insert(pair, state);
        Ok(())
    }

    /// Sends the requested outputs to `to` and checks that enough input was
    /// transferred to the pool beforehand to pay for them.
    pub(super) fn swap_pair(
        &mut self,
        pair: Address,
        amount0_out: U256,
        amount1_out: U256,
        to: Address,
    ) -> Result<(), Error> {
        let state = self.pair(pair)?;
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(Error::InsufficientOutputAmount);
        }
        if amount0_out >= state.reserve0 || amount1_out >= state.reserve1 {
            return Err(Error::InsufficientLiquidity);
        }

        let (token0, token1) = state.tokens.get();
        if !amount0_out.is_zero() {
            self.token_mut(token0)?.transfer(pair, to, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            self.token_mut(token1)?.transfer(pair, to, amount1_out)?;
        }

        let balance0 = self.token(token0)?.balance_of(pair);
        let balance1 = self.token(token1)?.balance_of(pair);
        let amount0_in = balance0.saturating_sub(state.reserve0 - amount0_out);
        let amount1_in = balance1.saturating_sub(state.reserve1 - amount1_out);
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(Error::InsufficientInputAmount);
        }
        state.check_invariant(balance0, balance1, amount0_in, amount1_in)?;

        self.sync(pair)
    }
}
