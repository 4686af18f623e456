//! Swaps executed against a ledger deployed from a scenario.

use {
    crate::{
        domain::{
            chain::Chain,
            eth::{Address, Deadline, TokenAddress, U256},
            executor::{self, GuardedExecutor, SpendCaps, SwapToPrice},
            sizing::{Fee, Price, Reserves},
        },
        infra::{
            config::{Pool, Scenario, Token},
            ledger::{Clock, Ledger, SystemClock},
        },
    },
    alloy_primitives::B256,
    number::units::EthUnit,
};

mod idempotence;

pub const OWNER: Address = Address::with_last_byte(0xc0);
pub const EXECUTOR: Address = Address::with_last_byte(0xe0);
pub const FACTORY: Address = Address::with_last_byte(0xf0);
pub const ROUTER: Address = Address::with_last_byte(0xd0);

pub fn gold() -> TokenAddress {
    TokenAddress(Address::with_last_byte(1))
}

pub fn silver() -> TokenAddress {
    TokenAddress(Address::with_last_byte(2))
}

pub fn copper() -> TokenAddress {
    TokenAddress(Address::with_last_byte(3))
}

/// Gold, silver and copper with a single 10 gold to 1000 silver pool.
pub fn scenario() -> Scenario {
    scenario_with(
        [50_000u64.eth(), 500_000u64.eth(), 5_000_000u64.eth()],
        vec![Pool {
            token_a: gold(),
            token_b: silver(),
            reserves: Reserves {
                a: 10u64.eth(),
                b: 1000u64.eth(),
            },
        }],
    )
}

pub fn scenario_with(supplies: [U256; 3], pools: Vec<Pool>) -> Scenario {
    let [gold_supply, silver_supply, copper_supply] = supplies;
    Scenario {
        owner: OWNER,
        executor: executor::Config {
            address: EXECUTOR,
            factory: FACTORY,
            router: ROUTER,
            fee: Fee::UNISWAP_V2,
        },
        init_code_digest: B256::ZERO,
        tokens: vec![
            Token {
                symbol: "GLD".to_owned(),
                address: gold(),
                supply: gold_supply,
            },
            Token {
                symbol: "SLV".to_owned(),
                address: silver(),
                supply: silver_supply,
            },
            Token {
                symbol: "CPR".to_owned(),
                address: copper(),
                supply: copper_supply,
            },
        ],
        pools,
    }
}

pub struct Setup {
    pub ledger: Ledger,
    pub executor: GuardedExecutor,
    pub pool: Address,
}

pub fn setup(scenario: &Scenario, clock: impl Clock + 'static) -> Setup {
    observe::tracing::initialize_reentrant("swap_to_price=debug");
    let ledger = Ledger::new(clock);
    ledger.transact(|tx| tx.deploy_scenario(scenario)).unwrap();
    let pool = ledger
        .view(|tx| tx.get_pair(FACTORY, gold(), silver()))
        .unwrap();
    Setup {
        ledger,
        executor: GuardedExecutor::new(scenario.executor),
        pool,
    }
}

pub fn metals() -> Setup {
    setup(&scenario(), SystemClock)
}

/// A request by the owner with unlimited spend caps and no deadline.
pub fn request(
    token_a: TokenAddress,
    token_b: TokenAddress,
    numerator: u64,
    denominator: u64,
) -> SwapToPrice {
    SwapToPrice {
        token_a,
        token_b,
        price: Price::new(U256::from(numerator), U256::from(denominator)),
        max_spend: SpendCaps {
            a: U256::MAX,
            b: U256::MAX,
        },
        recipient: OWNER,
        deadline: Deadline::never(),
    }
}

impl Setup {
    pub fn swap(&self, request: &SwapToPrice) -> Result<executor::Outcome, executor::Error> {
        self.ledger
            .transact(|tx| self.executor.swap_to_price(tx, OWNER, request))
    }

    /// Reserves of the gold/silver pool as `(gold, silver)`.
    pub fn reserves(&self) -> (U256, U256) {
        let reserves = self.ledger.view(|tx| tx.get_reserves(self.pool)).unwrap();
        // Gold has the lower address.
        (reserves.reserve0, reserves.reserve1)
    }

    pub fn balance(&self, token: TokenAddress, owner: Address) -> U256 {
        self.ledger.view(|tx| tx.balance_of(token, owner))
    }
}
