use {
    crate::domain::{
        eth::{Address, TokenAddress, U256},
        executor,
        sizing::{Fee, Reserves},
    },
    alloy_primitives::B256,
    number::serialization::HexOrDecimalU256,
    serde::Deserialize,
    serde_with::serde_as,
    std::{collections::HashSet, path::Path},
    tokio::fs,
};

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// The account holding the token supplies and calling the executor.
    owner: Address,

    /// Address of the guarded executor.
    executor: Address,

    /// Address of the pool registry.
    factory: Address,

    /// Address of the router the executor trades through.
    router: Address,

    /// Digest of the pool init code, used to derive pool addresses.
    #[serde(default)]
    init_code_digest: B256,

    /// Fee factor of the pools. Defaults to 997/1000.
    #[serde(default)]
    fee: Option<FeeConfig>,

    tokens: Vec<TokenConfig>,

    #[serde(default)]
    pools: Vec<PoolConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FeeConfig {
    numerator: u32,
    denominator: u32,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TokenConfig {
    symbol: String,
    address: Address,

    /// Initial supply, minted to the owner.
    #[serde_as(as = "HexOrDecimalU256")]
    supply: U256,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PoolConfig {
    /// Symbol of the first token.
    token_a: String,

    /// Symbol of the second token.
    token_b: String,

    #[serde_as(as = "HexOrDecimalU256")]
    reserve_a: U256,

    #[serde_as(as = "HexOrDecimalU256")]
    reserve_b: U256,
}

/// Load a simulation scenario from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> super::Scenario {
    let data = fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    let config = toml::de::from_str::<Config>(&data)
        .unwrap_or_else(|e| panic!("TOML syntax error while reading {path:?}: {e:?}"));

    let fee = match config.fee {
        Some(fee) => Fee::new(fee.numerator, fee.denominator)
            .unwrap_or_else(|e| panic!("invalid configuration: {e}")),
        None => Fee::default(),
    };

    let mut symbols = HashSet::new();
    let mut addresses = HashSet::new();
    let tokens = config
        .tokens
        .into_iter()
        .map(|token| {
            assert!(
                symbols.insert(token.symbol.to_ascii_lowercase()),
                "invalid configuration: duplicate token symbol {}",
                token.symbol,
            );
            assert!(
                addresses.insert(token.address),
                "invalid configuration: duplicate token address {}",
                token.address,
            );
            super::Token {
                symbol: token.symbol,
                address: TokenAddress(token.address),
                supply: token.supply,
            }
        })
        .collect::<Vec<_>>();

    let token = |symbol: &str| {
        tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .map(|token| token.address)
            .unwrap_or_else(|| panic!("invalid configuration: unknown token {symbol}"))
    };
    let pools = config
        .pools
        .iter()
        .map(|pool| super::Pool {
            token_a: token(&pool.token_a),
            token_b: token(&pool.token_b),
            reserves: Reserves {
                a: pool.reserve_a,
                b: pool.reserve_b,
            },
        })
        .collect();

    super::Scenario {
        owner: config.owner,
        executor: executor::Config {
            address: config.executor,
            factory: config.factory,
            router: config.router,
            fee,
        },
        init_code_digest: config.init_code_digest,
        tokens,
        pools,
    }
}
