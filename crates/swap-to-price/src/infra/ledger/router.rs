use {
    super::Transaction,
    crate::domain::{
        chain::{Chain, Error, ExactInputSwap},
        eth::{Address, U256},
        sizing,
    },
};

/// A router trading against the pools of a single factory.
#[derive(Clone, Copy, Debug)]
pub struct Router {
    pub factory: Address,
}

impl Transaction {
    pub(super) fn route_exact_input(
        &mut self,
        router: Address,
        sender: Address,
        swap: ExactInputSwap,
    ) -> Result<U256, Error> {
        let factory = self
            .state
            .routers
            .get(&router)
            .ok_or(Error::UnknownRouter(router))?
            .factory;
        if swap.deadline.has_passed(self.timestamp) {
            return Err(Error::Expired);
        }

        let [token_in, token_out] = swap.path;
        let pool = self
            .get_pair(factory, token_in, token_out)
            .ok_or(Error::InvalidPath)?;
        let pair = self.pair(pool)?;
        let reserves = pair.reserves();
        let zero_for_one = token_in == pair.tokens().get().0;
        let (reserve_in, reserve_out) = if zero_for_one {
            (reserves.reserve0, reserves.reserve1)
        } else {
            (reserves.reserve1, reserves.reserve0)
        };

        if swap.amount_in.is_zero() {
            return Err(Error::InsufficientInputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(Error::InsufficientLiquidity);
        }
        let amount_out = sizing::amount_out(swap.amount_in, reserve_in, reserve_out, pair.fee())
            .ok_or(Error::Overflow)?;
        if amount_out < swap.min_amount_out {
            return Err(Error::InsufficientOutputAmount);
        }

        self.token_mut(token_in)?
            .transfer_from(router, sender, pool, swap.amount_in)?;
        let (amount0_out, amount1_out) = if zero_for_one {
            (U256::ZERO, amount_out)
        } else {
            (amount_out, U256::ZERO)
        };
        self.swap_pair(pool, amount0_out, amount1_out, swap.recipient)?;

        Ok(amount_out)
    }
}
