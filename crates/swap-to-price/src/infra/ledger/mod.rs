//! An in-memory ledger holding tokens, pool registries, pools and routers.
//!
//! All reads and writes happen inside a [`Transaction`]. A transaction runs
//! against a private copy of the ledger state while holding the ledger lock,
//! and its effects become visible only if it returns `Ok`. An error discards
//! every effect of the transaction.

use {
    crate::{
        domain::{
            chain::{self, Chain, ExactInputSwap, PairReserves},
            eth::{Address, TokenAddress, TokenPair, U256},
            sizing::Fee,
        },
        infra::config::Scenario,
    },
    alloy_primitives::B256,
    anyhow::{Context, Result, anyhow, ensure},
    chrono::{DateTime, Utc},
    std::{collections::HashMap, sync::Mutex},
};

mod factory;
mod pair;
mod router;
mod token;

pub use self::pair::POOL_MAX_RESERVES;
use self::{
    factory::{Factory, PairProvider},
    pair::Pair,
    router::Router,
    token::Token,
};

/// Source of the timestamp transactions execute at.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Debug, Default)]
struct State {
    tokens: HashMap<TokenAddress, Token>,
    factories: HashMap<Address, Factory>,
    pairs: HashMap<Address, Pair>,
    routers: HashMap<Address, Router>,
}

pub struct Ledger {
    state: Mutex<State>,
    clock: Box<dyn Clock>,
}

impl Ledger {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            state: Default::default(),
            clock: Box::new(clock),
        }
    }

    /// Runs `f` as a single transaction. Its effects are committed if it
    /// returns `Ok` and discarded otherwise.
    pub fn transact<T, E>(&self, f: impl FnOnce(&mut Transaction) -> Result<T, E>) -> Result<T, E> {
        let mut state = self.state.lock().unwrap();
        let mut transaction = Transaction {
            state: state.clone(),
            timestamp: self.clock.now(),
        };
        let result = f(&mut transaction);
        if result.is_ok() {
            *state = transaction.state;
        }
        result
    }

    /// Reads from the current state without modifying it.
    pub fn view<T>(&self, f: impl FnOnce(&Transaction) -> T) -> T {
        let state = self.state.lock().unwrap();
        let transaction = Transaction {
            state: state.clone(),
            timestamp: self.clock.now(),
        };
        f(&transaction)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

pub struct Transaction {
    state: State,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    fn token(&self, token: TokenAddress) -> Result<&Token, chain::Error> {
        self.state
            .tokens
            .get(&token)
            .ok_or(chain::Error::UnknownToken(token))
    }

    fn token_mut(&mut self, token: TokenAddress) -> Result<&mut Token, chain::Error> {
        self.state
            .tokens
            .get_mut(&token)
            .ok_or(chain::Error::UnknownToken(token))
    }

    pub fn deploy_token(&mut self, address: TokenAddress, symbol: &str) -> Result<()> {
        ensure!(
            !self.state.tokens.contains_key(&address),
            "token {address} already deployed"
        );
        self.state.tokens.insert(address, Token::new(symbol));
        Ok(())
    }

    pub fn deploy_factory(
        &mut self,
        address: Address,
        init_code_digest: B256,
        fee: Fee,
    ) -> Result<()> {
        ensure!(
            !self.state.factories.contains_key(&address),
            "factory {address} already deployed"
        );
        let provider = PairProvider {
            factory: address,
            init_code_digest,
        };
        self.state
            .factories
            .insert(address, Factory::new(provider, fee));
        Ok(())
    }

    pub fn deploy_router(&mut self, address: Address, factory: Address) -> Result<()> {
        ensure!(
            self.state.factories.contains_key(&factory),
            "unknown factory {factory}"
        );
        ensure!(
            !self.state.routers.contains_key(&address),
            "router {address} already deployed"
        );
        self.state.routers.insert(address, Router { factory });
        Ok(())
    }

    /// Creates the empty pool of `token_a` and `token_b` at `factory`.
    pub fn create_pair(
        &mut self,
        factory: Address,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<Address> {
        self.token(token_a)?;
        self.token(token_b)?;
        let tokens = TokenPair::new(token_a, token_b).context("identical tokens")?;
        let registry = self
            .state
            .factories
            .get_mut(&factory)
            .ok_or_else(|| anyhow!("unknown factory {factory}"))?;
        let fee = registry.fee();
        let pool = registry
            .create_pair(tokens)
            .ok_or_else(|| anyhow!("pool for {token_a} and {token_b} already exists"))?;
        self.state.pairs.insert(pool, Pair::new(tokens, fee));
        Ok(pool)
    }

    pub fn mint(&mut self, token: TokenAddress, to: Address, amount: U256) -> Result<(), chain::Error> {
        self.token_mut(token)?.mint(to, amount)
    }

    pub fn transfer(
        &mut self,
        token: TokenAddress,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), chain::Error> {
        self.token_mut(token)?.transfer(from, to, amount)
    }

    /// Deploys the contracts and tokens of `scenario`, mints the supplies to
    /// its owner and seeds the pools from the owner's balances. The owner
    /// grants the executor an unlimited allowance on every token.
    pub fn deploy_scenario(&mut self, scenario: &Scenario) -> Result<()> {
        let executor = &scenario.executor;
        self.deploy_factory(executor.factory, scenario.init_code_digest, executor.fee)?;
        self.deploy_router(executor.router, executor.factory)?;

        for token in &scenario.tokens {
            self.deploy_token(token.address, &token.symbol)?;
            self.mint(token.address, scenario.owner, token.supply)?;
            self.approve(token.address, scenario.owner, executor.address, U256::MAX)?;
        }

        for pool in &scenario.pools {
            let address = self.create_pair(executor.factory, pool.token_a, pool.token_b)?;
            self.transfer(pool.token_a, scenario.owner, address, pool.reserves.a)
                .with_context(|| format!("seeding {address} with {}", pool.token_a))?;
            self.transfer(pool.token_b, scenario.owner, address, pool.reserves.b)
                .with_context(|| format!("seeding {address} with {}", pool.token_b))?;
            self.sync(address)?;
            tracing::debug!(%address, reserves = ?pool.reserves, "seeded pool");
        }
        Ok(())
    }

    pub fn symbol(&self, token: TokenAddress) -> Option<&str> {
        self.state.tokens.get(&token).map(Token::symbol)
    }
}

impl Chain for Transaction {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn get_pair(
        &self,
        factory: Address,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Option<Address> {
        self.state
            .factories
            .get(&factory)?
            .get_pair(&TokenPair::new(token_a, token_b)?)
    }

    fn get_reserves(&self, pair: Address) -> Result<PairReserves, chain::Error> {
        Ok(self.pair(pair)?.reserves())
    }

    fn balance_of(&self, token: TokenAddress, owner: Address) -> U256 {
        self.token(token)
            .map(|token| token.balance_of(owner))
            .unwrap_or_default()
    }

    fn allowance(&self, token: TokenAddress, owner: Address, spender: Address) -> U256 {
        self.token(token)
            .map(|token| token.allowance(owner, spender))
            .unwrap_or_default()
    }

    fn transfer_from(
        &mut self,
        token: TokenAddress,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), chain::Error> {
        self.token_mut(token)?
            .transfer_from(spender, from, to, amount)
    }

    fn approve(
        &mut self,
        token: TokenAddress,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), chain::Error> {
        self.token_mut(token)?.approve(owner, spender, amount);
        Ok(())
    }

    fn swap_exact_input(
        &mut self,
        router: Address,
        sender: Address,
        swap: ExactInputSwap,
    ) -> Result<U256, chain::Error> {
        self.route_exact_input(router, sender, swap)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::eth::Deadline,
        chrono::Duration,
        number::units::EthUnit,
    };

    const FACTORY: Address = Address::with_last_byte(0xf0);
    const ROUTER: Address = Address::with_last_byte(0xd0);
    const TRADER: Address = Address::with_last_byte(0xc0);

    fn gold() -> TokenAddress {
        TokenAddress(Address::with_last_byte(1))
    }

    fn silver() -> TokenAddress {
        TokenAddress(Address::with_last_byte(2))
    }

    fn clock_at(now: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now);
        clock
    }

    /// A ledger with a 10 gold to 1000 silver pool and a trader holding 100
    /// of each.
    fn ledger(clock: impl Clock + 'static) -> (Ledger, Address) {
        let ledger = Ledger::new(clock);
        let pool = ledger
            .transact(|tx| {
                tx.deploy_token(gold(), "GLD")?;
                tx.deploy_token(silver(), "SLV")?;
                tx.deploy_factory(FACTORY, B256::ZERO, Fee::UNISWAP_V2)?;
                tx.deploy_router(ROUTER, FACTORY)?;
                let pool = tx.create_pair(FACTORY, gold(), silver())?;
                tx.mint(gold(), pool, 10u64.eth())?;
                tx.mint(silver(), pool, 1000u64.eth())?;
                tx.sync(pool)?;
                tx.mint(gold(), TRADER, 100u64.eth())?;
                tx.mint(silver(), TRADER, 100u64.eth())?;
                tx.approve(gold(), TRADER, ROUTER, U256::MAX)?;
                anyhow::Ok(pool)
            })
            .unwrap();
        (ledger, pool)
    }

    fn swap(amount_in: U256) -> ExactInputSwap {
        ExactInputSwap {
            amount_in,
            min_amount_out: U256::ZERO,
            path: [gold(), silver()],
            recipient: TRADER,
            deadline: Deadline::never(),
        }
    }

    #[test]
    fn pool_is_registered_in_either_order() {
        let (ledger, pool) = ledger(SystemClock);
        ledger.view(|tx| {
            assert_eq!(tx.get_pair(FACTORY, gold(), silver()), Some(pool));
            assert_eq!(tx.get_pair(FACTORY, silver(), gold()), Some(pool));
            assert_eq!(tx.get_pair(FACTORY, gold(), gold()), None);
            assert_eq!(tx.get_pair(ROUTER, gold(), silver()), None);
            assert_eq!(tx.symbol(gold()), Some("GLD"));
        });
    }

    #[test]
    fn duplicate_deployments_are_rejected() {
        let (ledger, _) = ledger(SystemClock);
        assert!(ledger.transact(|tx| tx.deploy_token(gold(), "GLD")).is_err());
        assert!(
            ledger
                .transact(|tx| tx.create_pair(FACTORY, silver(), gold()))
                .is_err()
        );
        assert!(
            ledger
                .transact(|tx| tx.create_pair(FACTORY, gold(), gold()))
                .is_err()
        );
        assert!(
            ledger
                .transact(|tx| tx.deploy_router(ROUTER, Address::ZERO))
                .is_err()
        );
    }

    #[test]
    fn sync_stamps_the_transaction_time() {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(365);
        let (ledger, pool) = ledger(clock_at(now));
        let reserves = ledger.view(|tx| tx.get_reserves(pool)).unwrap();
        assert_eq!(
            reserves,
            PairReserves {
                reserve0: 10u64.eth(),
                reserve1: 1000u64.eth(),
                last_update: now,
            }
        );
    }

    #[test]
    fn failed_transactions_are_discarded() {
        let (ledger, pool) = ledger(SystemClock);

        let result = ledger.transact(|tx| {
            tx.mint(gold(), TRADER, 1u64.eth())?;
            tx.transfer_from(silver(), ROUTER, TRADER, pool, 1u64.eth())
        });
        assert_eq!(result, Err(chain::Error::InsufficientAllowance));
        ledger.view(|tx| {
            assert_eq!(tx.balance_of(gold(), TRADER), 100u64.eth());
        });

        ledger
            .transact(|tx| tx.mint(gold(), TRADER, 1u64.eth()))
            .unwrap();
        ledger.view(|tx| assert_eq!(tx.balance_of(gold(), TRADER), 101u64.eth()));
    }

    #[test]
    fn router_swaps_exact_input() {
        let (ledger, pool) = ledger(SystemClock);
        let amount_in = U256::from(526682316179835569_u64);
        let expected_out = U256::from(49890467170695440744_u128);

        let amount_out = ledger
            .transact(|tx| tx.swap_exact_input(ROUTER, TRADER, swap(amount_in)))
            .unwrap();
        assert_eq!(amount_out, expected_out);

        ledger.view(|tx| {
            assert_eq!(tx.balance_of(gold(), TRADER), 100u64.eth() - amount_in);
            assert_eq!(tx.balance_of(silver(), TRADER), 100u64.eth() + expected_out);
            let reserves = tx.get_reserves(pool).unwrap();
            assert_eq!(reserves.reserve0, 10u64.eth() + amount_in);
            assert_eq!(reserves.reserve1, 1000u64.eth() - expected_out);
            assert_eq!(reserves.reserve1 / reserves.reserve0, U256::from(90));
        });
    }

    #[test]
    fn router_rejects_invalid_swaps() {
        let (ledger, _) = ledger(SystemClock);

        let transact = |router: Address, swap: ExactInputSwap| {
            ledger.transact(|tx| tx.swap_exact_input(router, TRADER, swap))
        };
        assert_eq!(
            transact(FACTORY, swap(1u64.eth())),
            Err(chain::Error::UnknownRouter(FACTORY))
        );
        assert_eq!(
            transact(
                ROUTER,
                ExactInputSwap {
                    deadline: Deadline(DateTime::UNIX_EPOCH),
                    ..swap(1u64.eth())
                }
            ),
            Err(chain::Error::Expired)
        );
        assert_eq!(
            transact(
                ROUTER,
                ExactInputSwap {
                    path: [gold(), gold()],
                    ..swap(1u64.eth())
                }
            ),
            Err(chain::Error::InvalidPath)
        );
        assert_eq!(
            transact(ROUTER, swap(U256::ZERO)),
            Err(chain::Error::InsufficientInputAmount)
        );
        assert_eq!(
            transact(
                ROUTER,
                ExactInputSwap {
                    min_amount_out: 1000u64.eth(),
                    ..swap(1u64.eth())
                }
            ),
            Err(chain::Error::InsufficientOutputAmount)
        );
        // No allowance for silver.
        assert_eq!(
            transact(
                ROUTER,
                ExactInputSwap {
                    path: [silver(), gold()],
                    ..swap(1u64.eth())
                }
            ),
            Err(chain::Error::InsufficientAllowance)
        );
    }
}
